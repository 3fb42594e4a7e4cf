use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Table};

use brutyf_core::{HashType, InputFormat, Rule, RuleEngine};

/// Lists the built-in mutation rules.
pub fn rules() {
    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["Rule", "Example with \"Pass\""]);

    for name in RuleEngine::default_rules() {
        let example = name
            .parse::<Rule>()
            .map(|rule| rule.apply("Pass"))
            .unwrap_or_default();

        display_table.add_row(vec![Cell::new(name), Cell::new(example)]);
    }

    println!("{display_table}");
    println!("Custom rules: ^X prepends X, $X appends X, sXY replaces X with Y.");
}

/// Lists the supported hash types.
pub fn types() {
    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["Type", "Name", "Length", "Example", "Security"]);

    for hash_type in HashType::all() {
        let info = hash_type.info();

        display_table.add_row(vec![
            Cell::new(hash_type),
            Cell::new(info.name),
            Cell::new(info.length),
            Cell::new(info.example),
            Cell::new(info.security),
        ]);
    }

    println!("{display_table}");
}

/// Lists the layouts a hash file can have.
pub fn formats() {
    let mut display_table = Table::new();
    display_table.load_preset(UTF8_BORDERS_ONLY);
    display_table.set_header(vec!["Format", "Description"]);

    for format in InputFormat::all() {
        display_table.add_row(vec![Cell::new(format), Cell::new(format.description())]);
    }

    println!("{display_table}");
}
