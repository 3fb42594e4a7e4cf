use anyhow::{bail, Result};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Color, Table};

use brutyf_core::HashType;

use crate::Hash;

pub fn generate(hash: Hash) -> Result<()> {
    let Some(hash_type) = hash.hash_type else {
        let mut display_table = Table::new();
        display_table.load_preset(UTF8_BORDERS_ONLY);
        display_table.set_header(vec!["Type", "Hash"]);

        for (hash_type, digest) in HashType::generate_all(&hash.password) {
            display_table.add_row(vec![
                Cell::new(hash_type).fg(Color::Green),
                Cell::new(digest),
            ]);
        }

        println!("{display_table}");
        return Ok(());
    };

    match hash_type.generate(&hash.password, hash.salt.as_deref()) {
        Some(digest) => println!("{digest}"),
        None if hash_type.is_salted() => bail!("The {hash_type} type requires a --salt"),
        None => bail!("Unable to hash with the {hash_type} type"),
    }

    Ok(())
}
