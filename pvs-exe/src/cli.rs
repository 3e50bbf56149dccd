use argh::FromArgs;
use pvs::log;

/// Build a rough PVS for a synthetic grid level
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug
    #[argh(option)]
    pub verbose: Option<log::LevelFilter>,
    /// worker threads, 0 uses every CPU
    #[argh(option)]
    pub threads: Option<usize>,
    /// grid width in subsectors
    #[argh(option, default = "32")]
    pub width: usize,
    /// grid height in subsectors
    #[argh(option, default = "32")]
    pub height: usize,
    /// wall off some grid edges, picked from the random table at this seed
    #[argh(option)]
    pub seed: Option<u8>,
    /// report progress often, for a live progress bar
    #[argh(option)]
    pub interactive: Option<bool>,
    /// build a second time with this many threads and check the results match
    #[argh(option)]
    pub compare: Option<usize>,
    /// skip vis and write out the everything-visible table
    #[argh(switch)]
    pub no_vis: bool,
}
