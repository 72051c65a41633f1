pub mod run;
pub mod schema;

use sk_core::ComponentRegistry;

/// The registry every subcommand works against.
fn game_registry() -> Result<ComponentRegistry, String> {
    let mut registry = ComponentRegistry::new();
    sk_game::declare_components(&mut registry).map_err(|e| e.to_string())?;
    Ok(registry)
}
