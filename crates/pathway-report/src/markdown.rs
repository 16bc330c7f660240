//! Markdown summary of a generated dataset.

use std::fmt::Write;

use pathway_core::model::Grade;
use pathway_core::report::DatasetReport;

/// Render the batch statistics as markdown tables.
pub fn stats_to_markdown(report: &DatasetReport) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    let _ = writeln!(md, "# pathway dataset summary\n");
    let _ = writeln!(
        md,
        "Catalog: **{}** | {} records | seed {} | {}\n",
        report.catalog,
        stats.total,
        report.seed,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(level) = report.request.level {
        let _ = writeln!(md, "Fixed level: {level}\n");
    }
    if let Some(stream) = &report.request.stream {
        let _ = writeln!(md, "Fixed stream: {stream}\n");
    }

    md.push_str("## Records by level\n\n| Level | Records | Share |\n|---|---:|---:|\n");
    for (level, count) in &stats.per_level {
        let pct = share(*count, stats.total);
        let _ = writeln!(md, "| {level} | {count} | {pct:.1}% |");
    }

    if !stats.per_stream.is_empty() {
        let streamed: usize = stats.per_stream.values().sum();
        md.push_str("\n## Records by stream\n\n| Stream | Records | Share |\n|---|---:|---:|\n");
        for (stream, count) in &stats.per_stream {
            let pct = share(*count, streamed);
            let _ = writeln!(md, "| {stream} | {count} | {pct:.1}% |");
        }
    }

    md.push_str("\n## Careers\n\n| Career | Mean probability | Top career |\n|---|---:|---:|\n");
    for career in &stats.careers {
        let _ = writeln!(
            md,
            "| {} | {:.2}% | {} |",
            career.career,
            career.mean_probability * 100.0,
            career.top_count
        );
    }

    if stats.mean_aptitude.is_some() || stats.mean_gpa.is_some() {
        md.push_str("\n## Scores\n\n");
        if let Some(aptitude) = stats.mean_aptitude {
            let _ = writeln!(md, "- Mean aptitude: {aptitude:.2}");
        }
        if let Some(gpa) = stats.mean_gpa {
            let _ = writeln!(md, "- Mean GPA: {gpa:.2}");
        }
    }

    if !stats.grade_frequencies.is_empty() {
        md.push_str("\n## Grade frequencies\n\n");
        md.push_str("| Subject | A | B | C | S | F |\n|---|---:|---:|---:|---:|---:|\n");
        for (subject, counts) in &stats.grade_frequencies {
            let cells: Vec<String> = Grade::ALL
                .iter()
                .map(|g| format!("{:.1}%", counts.share(*g) * 100.0))
                .collect();
            let _ = writeln!(md, "| {subject} | {} |", cells.join(" | "));
        }
    }

    md
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}
