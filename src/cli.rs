use anyhow::Result;
use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "via-tools",
    version,
    about = "Snapshot the staging database and follow the dump job",
    after_help = "\
Environment:
  VIA_STAGE_FILE_PATH   directory the snapshot is written to (required)
  VIA_STAGE_PASSWORD    database password, passed to pg_dump as PGPASSWORD (required)
  VIA_STAGE_HOST        database host [default: localhost]
  VIA_STAGE_PORT        database port [default: 2234]
  VIA_STAGE_USER        database user [default: stage-crm-backend]
  VIA_STAGE_DATABASE    database name [default: stage]
  VIA_TOOLS_LOG         log filter, e.g. debug [default: info]"
)]
pub struct Cli {}

pub async fn run(args: Cli) -> Result<()> {
    crate::tui::run(args).await
}
