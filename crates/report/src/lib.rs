//! Trip sheet report formatter.
//!
//! Lays the engine's trip records out as a paginated fixed-column report:
//! a title and header block on every page, a column header row, and exactly
//! sixteen data rows per page (short pages are padded with blank rows so the
//! printed grid is always full). The layout is deterministic for a given
//! header and record list; rendering the pages to PDF or paper is the
//! shell's concern.

use tracing::debug;
use trip_session::{Header, TripRecord};

/// Column titles in print order.
pub const COLUMNS: [&str; 7] = [
    "Service user",
    "Origin",
    "Departure",
    "Start km",
    "Destination",
    "Arrival",
    "End km",
];

/// Column widths in characters.
pub const COLUMN_WIDTHS: [usize; 7] = [40, 62, 31, 26, 62, 31, 25];

/// Data rows per page.
pub const ROWS_PER_PAGE: usize = 16;

/// Time and odometer columns print centered; the rest left-aligned.
const CENTERED: [bool; 7] = [false, false, true, true, false, true, true];

const fn row_values(record: &TripRecord) -> [&String; 7] {
    [
        &record.service_user,
        &record.origin,
        &record.departure_time,
        &record.start_km,
        &record.destination,
        &record.arrival_time,
        &record.end_km,
    ]
}

/// Splits records into print pages, each padded to [`ROWS_PER_PAGE`] rows.
/// An empty record list still produces one page of blank rows.
#[must_use]
pub fn paginate(records: &[TripRecord]) -> Vec<Vec<TripRecord>> {
    let mut pages: Vec<Vec<TripRecord>> = if records.is_empty() {
        vec![Vec::new()]
    } else {
        records.chunks(ROWS_PER_PAGE).map(<[TripRecord]>::to_vec).collect()
    };
    for page in &mut pages {
        page.resize(ROWS_PER_PAGE, TripRecord::default());
    }
    pages
}

/// Renders the full report as plain text.
#[must_use]
pub fn render(header: &Header, records: &[TripRecord]) -> String {
    let pages = paginate(records);
    let total = pages.len();
    debug!(records = records.len(), pages = total, "rendering trip sheet");

    let mut out = String::new();
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        render_page(&mut out, header, page, index + 1, total);
    }
    out
}

fn render_page(out: &mut String, header: &Header, rows: &[TripRecord], number: usize, total: usize) {
    let width = line_width();
    out.push_str(&center("TRIP SHEET", width));
    out.push('\n');
    out.push('\n');
    push_pair(out, &format!("Date: {}", sanitize(&header.date)), &format!(
        "Sheet no.: {}",
        sanitize(&header.sheet_number)
    ));
    push_pair(out, &format!("Plate: {}", sanitize(&header.plate)), &format!(
        "Driver: {}",
        sanitize(&header.driver)
    ));
    push_pair(
        out,
        &format!("Depot start km: {}", sanitize(&header.depot_start_km)),
        &format!("Depot end km: {}", sanitize(&header.depot_end_km)),
    );
    out.push('\n');

    out.push('|');
    for (title, cell_width) in COLUMNS.into_iter().zip(COLUMN_WIDTHS) {
        out.push_str(&center(title, cell_width));
        out.push('|');
    }
    out.push('\n');

    for record in rows {
        out.push('|');
        for ((value, cell_width), centered) in
            row_values(record).into_iter().zip(COLUMN_WIDTHS).zip(CENTERED)
        {
            out.push_str(&cell(value, cell_width, centered));
            out.push('|');
        }
        out.push('\n');
    }

    let footer = format!("Page {number}/{total}");
    out.push_str(&format!("{footer:>width$}\n"));
}

fn push_pair(out: &mut String, left: &str, right: &str) {
    out.push_str(&format!("{left:<60}{right}\n"));
}

fn cell(text: &str, width: usize, centered: bool) -> String {
    let fitted = fit(&sanitize(text), width);
    if centered { center(&fitted, width) } else { format!("{fitted:<width$}") }
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

const fn line_width() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < COLUMN_WIDTHS.len() {
        total += COLUMN_WIDTHS[i];
        i += 1;
    }
    total + COLUMN_WIDTHS.len() + 1
}

/// Truncates to `width` characters, marking the cut with an ellipsis.
#[must_use]
pub fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 3 {
        return ".".repeat(width);
    }
    let kept: String = text.chars().take(width - 3).collect();
    format!("{}...", kept.trim_end())
}

/// Replaces typographic punctuation the printed sheet cannot carry, strips
/// control and non-Latin-1 characters, and collapses whitespace runs.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{2026}' => cleaned.push_str("..."),
            '\u{2013}' | '\u{2014}' => cleaned.push('-'),
            '\u{2019}' => cleaned.push('\''),
            '\u{00a0}' => cleaned.push(' '),
            _ if ch.is_control() || u32::from(ch) > 0x00ff => {}
            _ => cleaned.push(ch),
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn record(service_user: &str) -> TripRecord {
        TripRecord {
            service_user: service_user.to_string(),
            origin: "Via Roma 1".to_string(),
            departure_time: "08:15".to_string(),
            start_km: "120".to_string(),
            destination: "Via Milano 2".to_string(),
            arrival_time: "08:40".to_string(),
            end_km: "127".to_string(),
        }
    }

    #[test]
    fn empty_sheet_still_fills_one_page() {
        let pages = paginate(&[]);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].len(), ROWS_PER_PAGE);
        assert!(pages[0].iter().all(TripRecord::is_blank));
    }

    #[test]
    fn seventeen_records_spill_onto_a_padded_second_page() {
        let records: Vec<TripRecord> = (0..17).map(|i| record(&format!("rider {i}"))).collect();
        let pages = paginate(&records);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].len(), ROWS_PER_PAGE);
        assert_eq!(pages[1][0].service_user, "rider 16");
        assert!(pages[1][1].is_blank());
    }

    #[test]
    fn fit_truncates_with_an_ellipsis() {
        assert_eq!(fit("short", 10), "short");
        assert_eq!(fit("a very long address that cannot fit", 12), "a very lo...");
        assert!(fit("a very long address that cannot fit", 12).chars().count() <= 12);
    }

    #[test]
    fn sanitize_flattens_typographic_punctuation() {
        assert_eq!(sanitize("Caff\u{e8} \u{2013} centro\u{2026}"), "Caff\u{e8} - centro...");
        assert_eq!(sanitize("no\u{00a0}break   run"), "no break run");
        assert_eq!(sanitize("zero\u{200b}width"), "zerowidth");
        assert_eq!(sanitize("emoji \u{1f697} gone"), "emoji gone");
    }

    #[test]
    fn render_lays_out_header_rows_and_footer() {
        let header = Header {
            date: "2025-06-01".to_string(),
            driver: "Mario Rossi".to_string(),
            ..Header::default()
        };
        let text = render(&header, &[record("John Doe")]);

        assert!(text.contains("TRIP SHEET"));
        assert!(text.contains("Date: 2025-06-01"));
        assert!(text.contains("Driver: Mario Rossi"));
        assert!(text.contains("John Doe"));
        assert!(text.ends_with("Page 1/1\n"));

        // Column header row plus sixteen data rows, all bordered.
        let grid_rows = text.lines().filter(|line| line.starts_with('|')).count();
        assert_eq!(grid_rows, 1 + ROWS_PER_PAGE);
    }

    #[test]
    fn render_numbers_every_page() {
        let records: Vec<TripRecord> = (0..20).map(|i| record(&format!("rider {i}"))).collect();
        let text = render(&Header::default(), &records);
        assert!(text.contains("Page 1/2"));
        assert!(text.ends_with("Page 2/2\n"));
    }
}
