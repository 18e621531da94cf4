//! reportes-admin: inspect and patch the report store without the HTTP API.
//!
//! ```text
//! reportes-admin list
//! reportes-admin show <id>
//! reportes-admin update <id> [--lat 10.0] [--lng -74.0] [--tipo alerta] [--desc "texto"]
//! reportes-admin set-photo <id> <imagen.jpg>
//! reportes-admin backup
//! ```
//!
//! Take a copy first: `reportes-admin backup`.

use clap::Parser;
use tracing::debug;

use reportes_gps::admin;
use reportes_gps::config::AdminArgs;
use reportes_gps::logging;

fn main() {
    let args = AdminArgs::parse();
    logging::init_stderr(&args.log_level);

    debug!(
        database_path = %args.database_path.display(),
        command = ?args.command,
        "reportes-admin starting"
    );

    let code = admin::execute(
        &args.database_path,
        &args.command,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr(),
    );
    std::process::exit(code);
}
