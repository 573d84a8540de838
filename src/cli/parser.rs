use clap::{Parser, Subcommand};

/// Command-line interface definition for shiftpoint
/// Scheduling and geofenced attendance tracking over SQLite
#[derive(Parser)]
#[command(
    name = "shiftpoint",
    version = env!("CARGO_PKG_VERSION"),
    about = "Manage work contracts, schedule conflicts and geofenced clock-in/clock-out using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the current time (RFC 3339 or "YYYY-MM-DD HH:MM", tenant-local)
    #[arg(global = true, long = "now", hide = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,
    },

    /// Register a tenant organization
    Tenant {
        /// Tenant name
        name: String,
    },

    /// Register a worker under a tenant
    Worker {
        #[arg(long)]
        tenant: i64,
        /// Worker name
        name: String,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Register a task under a tenant
    Task {
        #[arg(long)]
        tenant: i64,
        /// Task title
        title: String,
    },

    /// Manage contracts
    Contract {
        #[command(subcommand)]
        action: ContractCmd,
    },

    /// Manage contract templates
    Template {
        #[command(subcommand)]
        action: TemplateCmd,
    },

    /// Record a geofenced clock-in or clock-out on a contract
    Pointage {
        #[arg(long)]
        tenant: i64,
        #[arg(long)]
        contract: i64,
        #[arg(long)]
        worker: i64,
        /// Reported location, "lat,lon"
        #[arg(long)]
        location: String,
        #[arg(long)]
        note: Option<String>,
        /// Explicit departure time (clock-out only)
        #[arg(long)]
        departure: Option<String>,
    },

    /// Run the auto-termination sweep once
    Sweep,

    /// Run the daily assignment notifications once
    NotifyDaily,

    /// Run the periodic sweeps until interrupted
    Watch,
}

#[derive(Subcommand)]
pub enum ContractCmd {
    /// Create a contract (optionally repeated over the following days)
    Add {
        #[arg(long)]
        tenant: i64,
        /// Work site, "lat,lon"
        #[arg(long)]
        location: String,
        /// Start, "YYYY-MM-DD HH:MM" tenant-local
        #[arg(long)]
        start: String,
        /// End, "YYYY-MM-DD HH:MM" tenant-local
        #[arg(long)]
        end: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "break")]
        break_minutes: Option<i64>,
        /// Assigned worker ids
        #[arg(long = "worker")]
        workers: Vec<i64>,
        /// Attached task ids
        #[arg(long = "task")]
        tasks: Vec<i64>,
        /// Number of daily repetitions to generate
        #[arg(long, default_value_t = 0)]
        repeat: i64,
    },

    /// Update fields of a contract (re-validates window and conflicts)
    Update {
        #[arg(long)]
        tenant: i64,
        id: i64,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "break")]
        break_minutes: Option<i64>,
        #[arg(long = "worker")]
        workers: Vec<i64>,
        #[arg(long = "task")]
        tasks: Vec<i64>,
    },

    /// List a tenant's contracts, optionally narrowed to one worker
    List {
        #[arg(long)]
        tenant: i64,
        #[arg(long)]
        worker: Option<i64>,
    },

    /// Show one contract as JSON
    Show {
        #[arg(long)]
        tenant: i64,
        id: i64,
    },

    /// Soft-delete a contract
    Del {
        #[arg(long)]
        tenant: i64,
        id: i64,
    },

    /// List presence records of a contract
    Presences {
        #[arg(long)]
        tenant: i64,
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TemplateCmd {
    /// Save an existing contract as a reusable template
    Save {
        #[arg(long)]
        tenant: i64,
        #[arg(long)]
        contract: i64,
        /// Template name
        name: String,
    },

    /// Stamp contracts out of a template, one per worker
    Use {
        #[arg(long)]
        tenant: i64,
        #[arg(long)]
        template: i64,
        #[arg(long = "worker")]
        workers: Vec<i64>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },

    /// List a tenant's templates
    List {
        #[arg(long)]
        tenant: i64,
    },
}
