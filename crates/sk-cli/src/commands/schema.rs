use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sk_core::{ComponentKind, ComponentRegistry};

pub fn run(tag: Option<&str>, plain: bool) -> Result<(), String> {
    let registry = super::game_registry()?;
    let kinds = select(&registry, tag)?;

    if plain {
        println!("{}", plain_listing(&kinds));
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Component", "Field", "Default"]);
    for kind in &kinds {
        for spec in kind.fields() {
            table.add_row(vec![kind.tag().to_string(), spec.name.clone(), spec.default.to_string()]);
        }
    }

    println!("{table}");
    println!();
    let fields: usize = kinds.iter().map(|k| k.fields().len()).sum();
    println!(
        "  {} components, {} fields",
        kinds.len().to_string().bold(),
        fields
    );
    Ok(())
}

fn select<'r>(registry: &'r ComponentRegistry, tag: Option<&str>) -> Result<Vec<&'r ComponentKind>, String> {
    match tag {
        Some(tag) => registry.get(tag).map(|k| vec![k]).map_err(|e| e.to_string()),
        None => Ok(registry.kinds().collect()),
    }
}

fn plain_listing(kinds: &[&ComponentKind]) -> String {
    kinds
        .iter()
        .flat_map(|kind| {
            kind.fields()
                .iter()
                .map(move |spec| format!("{}.{} = {}", kind.tag(), spec.name, spec.default))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
