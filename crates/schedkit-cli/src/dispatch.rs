use schedkit_client::commands;
use schedkit_client::commands::project::ProjectRequest;
use schedkit_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, ProjectArgs};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Normalize { path, .. } => commands::normalize::run(path),
        Commands::Reconcile { run1, run2, .. } => commands::reconcile::run(run1, run2),
        Commands::Project(args) => commands::project::run(project_request(args)),
        Commands::Match {
            item_name,
            mapping,
            merchant,
            ..
        } => commands::match_item::run(item_name, mapping.as_deref(), merchant.as_deref()),
    }
}

fn project_request(args: &ProjectArgs) -> ProjectRequest {
    ProjectRequest {
        path: args.path.clone(),
        second_run: args.second_run.clone(),
        mapping: args.mapping.clone(),
        guidance: args.guidance.clone(),
        merchant: args.merchant.clone(),
    }
}
