use crate::cli::Commands;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Normalize { json, .. }
        | Commands::Reconcile { json, .. }
        | Commands::Match { json, .. } => *json,
        Commands::Project(args) => args.json,
    };
    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}
