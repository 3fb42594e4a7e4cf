use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Color, Table};

use brutyf_core::{HashType, HashTypeCandidate};

use crate::Identify;

fn confidence_cell(candidate: &HashTypeCandidate) -> Cell {
    let color = match candidate.confidence {
        90.. => Color::Green,
        50..=89 => Color::Yellow,
        _ => Color::Red,
    };

    Cell::new(format!("{}%", candidate.confidence)).fg(color)
}

pub fn identify(id: Identify) {
    let candidates = HashType::identify_with_confidence(&id.hash);

    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["Type", "Confidence", "Description", "Security"]);

    for candidate in &candidates {
        let info = candidate.hash_type.info();

        display_table.add_row(vec![
            Cell::new(candidate.hash_type),
            confidence_cell(candidate),
            Cell::new(info.description),
            Cell::new(info.security),
        ]);
    }

    println!("{display_table}");

    if let Some(best) = candidates.first() {
        if best.hash_type != HashType::Unknown {
            println!("Use --hash-type {} to force it.", best.hash_type);
        }
    }
}
