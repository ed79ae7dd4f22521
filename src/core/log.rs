use crate::db::log::{LogRow, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::truncate;
use ansi_term::Colour;
use regex::Regex;

const OP_TARGET_MAX: usize = 60;

fn strip_ansi(s: &str) -> String {
    match Regex::new(r"\x1B\[[0-9;]*[mK]") {
        Ok(re) => re.replace_all(s, "").into_owned(),
        Err(_) => s.to_string(),
    }
}

/// Restituisce il colore ANSI in base all'operazione
fn color_for_operation(op: &str) -> Colour {
    match op {
        "add" | "start" => Colour::Green,
        "del" | "remove" => Colour::Red,
        "edit" | "toggle" | "update" => Colour::Yellow,
        "submit" | "done" => Colour::Cyan,
        "export" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51), // arancione
        _ => Colour::White,
    }
}

/// Unica colonna `operation (target)`: solo l'operazione è colorata, il
/// taglio a 60 caratteri avviene sul testo visibile SENZA ANSI.
fn paint_op_target(row: &LogRow) -> String {
    let color = color_for_operation(&row.operation);
    let mut painted = color.paint(row.operation.as_str()).to_string();
    if !row.target.is_empty() {
        painted.push_str(&format!(" ({})", row.target));
    }

    let visible = strip_ansi(&painted);
    if visible.chars().count() <= OP_TARGET_MAX {
        return painted;
    }

    // ricolora solo la prima parola dopo il taglio
    let cut = truncate(&visible, OP_TARGET_MAX);
    match cut.split_once(' ') {
        Some((op, rest)) => format!("{} {rest}", color.paint(op)),
        None => color.paint(cut).to_string(),
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let rows = load_log(&pool.conn)?;
        if rows.is_empty() {
            println!("No log entries.");
            return Ok(());
        }

        let dates: Vec<String> = rows
            .iter()
            .map(|r| {
                chrono::DateTime::parse_from_rfc3339(&r.date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or_else(|_| r.date.clone())
            })
            .collect();
        let painted: Vec<String> = rows.iter().map(paint_op_target).collect();

        let id_w = rows.iter().map(|r| r.id.to_string().len()).max().unwrap_or(1);
        let date_w = dates.iter().map(String::len).max().unwrap_or(10);
        let op_w = painted
            .iter()
            .map(|p| strip_ansi(p).chars().count())
            .max()
            .unwrap_or(10);

        println!("📜 Internal log:\n");

        for ((row, date), op_target) in rows.iter().zip(&dates).zip(&painted) {
            // padding calcolato sulle dimensioni reali SENZA ANSI
            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(op_target).chars().count()));
            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                row.id, date, op_target, padding, row.message
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colour_codes() {
        let painted = Colour::Green.paint("add").to_string();
        assert_eq!(strip_ansi(&painted), "add");
    }

    #[test]
    fn long_targets_are_cut_on_visible_text() {
        let row = LogRow {
            id: 1,
            date: String::new(),
            operation: "add".into(),
            target: "x".repeat(100),
            message: String::new(),
        };
        let visible = strip_ansi(&paint_op_target(&row));
        assert_eq!(visible.chars().count(), OP_TARGET_MAX);
        assert!(visible.starts_with("add ("));
    }
}
