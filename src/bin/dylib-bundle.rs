use bpaf::Bpaf;
use camino::Utf8PathBuf;
use dylib_bundler::config::default_system_prefixes;
use dylib_bundler::{
    BundleConfig, Bundler, DependencySource, Error, InstallNameTool, Interrupt, LinePrompter,
    MachOReader, Otool, TerminalPrompter,
};
use std::io::{self, IsTerminal};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options)]
/// Recursively find, copy, and fix rpaths for macOS dylibs
struct Options {
    #[bpaf(short, long)]
    /// Verbose output
    verbose: bool,

    #[bpaf(short('N'), long)]
    /// Dry run - discover and report, don't copy or patch
    dry_run: bool,

    #[bpaf(short, long)]
    /// Manually process all dylibs, including system libraries
    all: bool,

    #[bpaf(long)]
    /// Read load commands directly instead of running otool
    in_process: bool,

    #[bpaf(long)]
    /// Don't ad-hoc sign the patched copies
    no_resign: bool,

    #[bpaf(long, argument("PREFIX"))]
    /// Additional system library prefix to leave to the host
    system_prefix: Vec<String>,

    #[bpaf(positional("INPUT"))]
    /// A dylib file or a directory of dylibs
    input: Utf8PathBuf,

    #[bpaf(positional("OUTPUT"))]
    /// Directory to store the bundled libraries
    output: Utf8PathBuf,
}

/// Send progress to stderr so the final report on stdout stays clean.
///
/// `-v` adds levels, targets and line numbers at DEBUG; `RUST_LOG` overrides
/// the default level either way.
fn init_logging(verbose: bool) {
    let filter_level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(filter_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_level(verbose)
        .with_target(verbose)
        .with_line_number(verbose)
        .without_time()
        .with_writer(io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    debug!("Logging initialized with level: {}", filter_level);
}

fn main() -> Result<(), Error> {
    let options = options().run();

    init_logging(options.verbose);

    let mut system_prefixes = default_system_prefixes();
    system_prefixes.extend(options.system_prefix.iter().cloned());

    let config = BundleConfig::builder()
        .input(options.input.clone())
        .output(options.output.clone())
        .include_system(options.all)
        .dry_run(options.dry_run)
        .resign(!options.no_resign)
        .system_prefixes(system_prefixes)
        .build();

    debug!("Configuration: {:?}", config);

    if options.in_process {
        bundle(config, MachOReader)
    } else {
        bundle(config, Otool)
    }
}

fn bundle<S: DependencySource>(config: BundleConfig, source: S) -> Result<(), Error> {
    let bundler =
        Bundler::new(config, source, InstallNameTool).with_interrupt(Interrupt::install()?);

    let report = if io::stdin().is_terminal() {
        bundler.run(&mut TerminalPrompter)?
    } else {
        let stdin = io::stdin();
        bundler.run(&mut LinePrompter::new(stdin.lock(), io::stderr()))?
    };

    println!("{}", report);

    Ok(())
}
