use crate::reports;
use tracewise::letters::ReferenceStore;

pub fn run(store: &ReferenceStore) {
    println!("\n📚 === REFERENCE LETTERS === 📚");
    reports::print_letters(store);
}
