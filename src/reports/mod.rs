use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use tracewise::engine::EvaluatorKind;
use tracewise::letters::ReferenceStore;
use tracewise::metrics::HandwritingMetrics;
use tracewise::session::{Stage, StageScores, StrokeRecord};

/// Outcome of driving one execution form through a full attempt.
pub struct FormRun {
    pub kind: EvaluatorKind,
    pub history: Vec<StrokeRecord>,
    pub scores: StageScores,
    pub final_score: Option<f32>,
    pub cues: usize,
}

pub struct ComparisonRow {
    pub stage: Stage,
    pub path: Option<usize>,
    pub fg_score: f32,
    pub fg_complete: bool,
    pub bg_score: f32,
    pub bg_complete: bool,
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right_align(table: &mut Table, cols: std::ops::Range<usize>) {
    for i in cols {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn yes_no(v: bool) -> Cell {
    if v {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::Red)
    }
}

fn path_label(path: Option<usize>) -> String {
    path.map_or_else(|| "-".to_string(), |p| p.to_string())
}

pub fn print_stroke_table(history: &[StrokeRecord]) {
    println!("\n✍️  === STROKES === ✍️");
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Stage"),
        Cell::new("Stroke"),
        Cell::new("Path"),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Complete"),
        Cell::new("Stage Score").add_attribute(Attribute::Bold),
    ]);
    right_align(&mut table, 3..7);

    for (i, rec) in history.iter().enumerate() {
        let ev = &rec.evaluation;
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(rec.stage),
            Cell::new(ev.stroke_id),
            Cell::new(path_label(ev.path_index)),
            Cell::new(format!("{:.1}", ev.score)).fg(Color::Cyan),
            yes_no(ev.complete),
            Cell::new(format!("{:.1}", rec.stage_score)),
        ]);
    }
    println!("{}", table);
}

pub fn print_session_summary(
    letter: &str,
    kind: EvaluatorKind,
    stage: Stage,
    scores: StageScores,
    final_score: Option<f32>,
) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Letter").add_attribute(Attribute::Bold),
        Cell::new("Evaluator"),
        Cell::new("Stage"),
        Cell::new("Template"),
        Cell::new("Guided"),
        Cell::new("Final").fg(Color::Green),
    ]);
    right_align(&mut table, 3..6);
    table.add_row(vec![
        Cell::new(letter),
        Cell::new(kind),
        Cell::new(stage),
        Cell::new(format!("{:.1}", scores.template())),
        Cell::new(format!("{:.1}", scores.guided())),
        Cell::new(final_score.map_or_else(|| "-".into(), |s| format!("{:.1}", s)))
            .fg(Color::Green),
    ]);
    println!("{}", table);
}

pub fn print_comparison(rows: &[ComparisonRow]) {
    println!("\n⚖️  === FOREGROUND vs BACKGROUND === ⚖️");
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Stage").add_attribute(Attribute::Bold),
        Cell::new("Path"),
        Cell::new("FG Score").fg(Color::Cyan),
        Cell::new("FG Done"),
        Cell::new("BG Score").fg(Color::Cyan),
        Cell::new("BG Done"),
        Cell::new("Agree").add_attribute(Attribute::Bold),
    ]);
    right_align(&mut table, 1..3);

    for r in rows {
        table.add_row(vec![
            Cell::new(r.stage),
            Cell::new(path_label(r.path)),
            Cell::new(format!("{:.1}", r.fg_score)),
            yes_no(r.fg_complete),
            Cell::new(format!("{:.1}", r.bg_score)),
            yes_no(r.bg_complete),
            yes_no(r.fg_complete == r.bg_complete),
        ]);
    }
    println!("{}", table);
}

pub fn print_form_summary(runs: &[&FormRun]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Evaluator").add_attribute(Attribute::Bold),
        Cell::new("Strokes"),
        Cell::new("Template"),
        Cell::new("Guided"),
        Cell::new("Final").fg(Color::Green),
        Cell::new("Cues"),
    ]);
    right_align(&mut table, 1..6);

    for run in runs {
        table.add_row(vec![
            Cell::new(run.kind),
            Cell::new(run.history.len()),
            Cell::new(format!("{:.1}", run.scores.template())),
            Cell::new(format!("{:.1}", run.scores.guided())),
            Cell::new(run.final_score.map_or_else(|| "-".into(), |s| format!("{:.1}", s)))
                .fg(Color::Green),
            Cell::new(run.cues),
        ]);
    }
    println!("{}", table);
}

pub fn print_letters(store: &ReferenceStore) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Letter").add_attribute(Attribute::Bold),
        Cell::new("Paths"),
        Cell::new("Segments"),
        Cell::new("Length"),
    ]);
    right_align(&mut table, 1..4);

    for glyph in store.glyphs() {
        let segments: usize = glyph.paths.iter().map(|p| p.segment_count()).sum();
        let length: f32 = glyph.paths.iter().map(|p| p.length()).sum();
        table.add_row(vec![
            Cell::new(&glyph.letter).set_alignment(CellAlignment::Center),
            Cell::new(glyph.path_count()),
            Cell::new(segments),
            Cell::new(format!("{:.1}", length)),
        ]);
    }
    println!("{}", table);
}

pub fn print_metrics(letter: &str, m: &HandwritingMetrics) {
    println!("\n💯 === HANDWRITING METRICS: {} === 💯", letter);
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Smoothness"),
        Cell::new("Accuracy"),
        Cell::new("Speed"),
        Cell::new("Beauty").add_attribute(Attribute::Bold).fg(Color::Green),
    ]);
    right_align(&mut table, 0..4);
    table.add_row(vec![
        Cell::new(format!("{:.1}", m.smoothness)),
        Cell::new(format!("{:.1}", m.accuracy)),
        Cell::new(format!("{:.1}", m.speed)),
        Cell::new(format!("{:.1}", m.beauty_score)).fg(Color::Green),
    ]);
    println!("{}", table);
}

pub fn print_frame(lines: &[String]) {
    let width = lines.first().map_or(0, |l| l.chars().count());
    let border = format!("+{}+", "-".repeat(width));
    println!("\n{}", border);
    for line in lines {
        println!("|{}|", line);
    }
    println!("{}", border);
}
