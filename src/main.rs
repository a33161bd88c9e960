//! OLED Bus Trace
//!
//! Replays driver operations against an in-memory transport and prints the
//! exact command/data traffic an SSD1306 panel would receive. Handy for
//! checking a wiring-independent init sequence or a flush window before
//! reaching for a logic analyzer.
//!
//! # Usage
//!
//! ```bash
//! # Show derived panel registers
//! oled-trace panel --width 128 --height 32
//!
//! # Trace the startup sequence
//! oled-trace startup --config panel.toml
//!
//! # Trace a few drawing operations and a flush
//! oled-trace run hline:0,0,16 vline:4,0,20 scroll-left:0,7 --preview
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use oled_sync::hal::{InstantDelay, NoReset, RecordingInterface, Transaction};
use oled_sync::{Color, Display, DisplayConfig, DisplayError, ScrollDirection};

/// OLED Bus Trace
///
/// Shows what the SSD1306 driver puts on the bus
#[derive(Parser)]
#[command(name = "oled-trace")]
#[command(version = "0.1.0")]
#[command(about = "Trace SSD1306 command and data traffic without hardware")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the register values derived for a panel
    Panel(PanelArgs),

    /// Trace the startup sequence
    Startup(PanelArgs),

    /// Start up, apply operations, flush, and trace everything after startup
    Run {
        #[command(flatten)]
        panel: PanelArgs,

        /// Operations, e.g. `hline:0,0,16`, `rect:2,2,8,4`, `scroll-up:0,3`
        ops: Vec<Op>,

        /// Include the startup traffic in the trace
        #[arg(long)]
        include_startup: bool,

        /// Render the framebuffer after the final flush
        #[arg(long)]
        preview: bool,
    },
}

#[derive(Args)]
struct PanelArgs {
    /// Panel config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Panel width (overrides config)
    #[arg(long)]
    width: Option<u16>,

    /// Panel height (overrides config)
    #[arg(long)]
    height: Option<u16>,

    /// Panel powered from external VCC
    #[arg(long)]
    external_vcc: bool,

    /// Rotation in quarter turns
    #[arg(short, long)]
    rotation: Option<u8>,
}

impl PanelArgs {
    fn resolve(&self) -> Result<DisplayConfig> {
        let mut config = match &self.config {
            Some(path) => DisplayConfig::load(path)
                .with_context(|| format!("Failed to load panel config: {}", path.display()))?,
            None => DisplayConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.external_vcc {
            config.external_vcc = true;
        }
        if let Some(rotation) = self.rotation {
            config = config.with_rotation(rotation);
        }

        config.validate()?;
        Ok(config)
    }
}

/// A single driver operation given on the command line
#[derive(Debug, Clone)]
enum Op {
    HLine(i32, i32, i32, Color),
    VLine(i32, i32, i32, Color),
    Pixel(i32, i32, Color),
    Rect(i32, i32, i32, i32, Color),
    Rotate(i32),
    Fill(bool),
    Invert(bool),
    Dim(bool),
    Scroll(ScrollDirection, u8, u8),
    StopScroll,
    Flush,
}

impl FromStr for Op {
    type Err = anyhow::Error;

    /// `name[:a,b,...][@color]` where color is `white`, `black` or `inverse`
    fn from_str(s: &str) -> Result<Self> {
        let (body, color) = match s.split_once('@') {
            Some((body, color)) => (body, parse_color(color)?),
            None => (s, Color::White),
        };
        let (name, args) = body.split_once(':').unwrap_or((body, ""));
        let nums: Vec<i32> = if args.is_empty() {
            Vec::new()
        } else {
            args.split(',')
                .map(|n| n.trim().parse::<i32>())
                .collect::<std::result::Result<_, _>>()
                .with_context(|| format!("Bad arguments in operation: {}", s))?
        };

        let arity = |n: usize| -> Result<()> {
            if nums.len() == n {
                Ok(())
            } else {
                bail!("Operation `{}` takes {} arguments, got {}", name, n, nums.len())
            }
        };
        let page = |v: i32| -> Result<u8> {
            u8::try_from(v).map_err(|_| anyhow!("Page index out of range: {}", v))
        };

        let op = match name {
            "hline" => {
                arity(3)?;
                Op::HLine(nums[0], nums[1], nums[2], color)
            }
            "vline" => {
                arity(3)?;
                Op::VLine(nums[0], nums[1], nums[2], color)
            }
            "pixel" => {
                arity(2)?;
                Op::Pixel(nums[0], nums[1], color)
            }
            "rect" => {
                arity(4)?;
                Op::Rect(nums[0], nums[1], nums[2], nums[3], color)
            }
            "rotate" => {
                arity(1)?;
                Op::Rotate(nums[0])
            }
            "fill" => Op::Fill(true),
            "clear" => Op::Fill(false),
            "invert" => Op::Invert(true),
            "normal" => Op::Invert(false),
            "dim" => Op::Dim(true),
            "bright" => Op::Dim(false),
            "stop-scroll" => Op::StopScroll,
            "flush" => Op::Flush,
            scroll if scroll.starts_with("scroll-") => {
                arity(2)?;
                let direction = match &scroll["scroll-".len()..] {
                    "left" => ScrollDirection::Left,
                    "right" => ScrollDirection::Right,
                    "diag-left" => ScrollDirection::LeftDiagonal,
                    "diag-right" => ScrollDirection::RightDiagonal,
                    "up" => ScrollDirection::Up,
                    other => bail!("Unknown scroll direction: {}", other),
                };
                Op::Scroll(direction, page(nums[0])?, page(nums[1])?)
            }
            other => bail!("Unknown operation: {}", other),
        };
        Ok(op)
    }
}

fn parse_color(s: &str) -> Result<Color> {
    match s {
        "white" | "on" => Ok(Color::White),
        "black" | "off" => Ok(Color::Black),
        "inverse" | "xor" => Ok(Color::Inverse),
        other => bail!("Unknown color: {}", other),
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Panel(args) => handle_panel(&args),
        Commands::Startup(args) => handle_startup(&args, cli.verbose),
        Commands::Run {
            panel,
            ops,
            include_startup,
            preview,
        } => handle_run(&panel, &ops, include_startup, preview, cli.verbose),
    }
}

fn driver_error(e: DisplayError<oled_sync::hal::InjectedFailure>) -> anyhow::Error {
    anyhow!("{}", e)
}

fn start(config: &DisplayConfig) -> Result<Display<RecordingInterface>> {
    let mut display = Display::new(RecordingInterface::new(), config).map_err(driver_error)?;
    display
        .startup(&mut NoReset, &mut InstantDelay, None)
        .map_err(driver_error)?;
    Ok(display)
}

fn handle_panel(args: &PanelArgs) -> Result<()> {
    let config = args.resolve()?;
    let display = Display::new(RecordingInterface::new(), &config).map_err(driver_error)?;
    let panel = display.panel();

    println!("{}", "=".repeat(50));
    println!(
        "{}",
        format!("Panel {}x{}", panel.width, panel.height).cyan().bold()
    );
    println!("{}", "=".repeat(50));
    println!(
        "  Power source:   {}",
        if panel.external_vcc { "external VCC" } else { "internal charge pump" }
    );
    println!("  Multiplex:      {:#04x}", panel.multiplex);
    println!("  COM pins:       {:#04x}", panel.com_pins);
    println!("  Contrast:       {:#04x}", panel.contrast);
    println!("  Charge pump:    {:#04x}", panel.charge_pump);
    println!("  Precharge:      {:#04x}", panel.precharge);
    println!("  Display offset: {:#04x}", panel.display_offset);
    println!("  Start line:     {:#04x}", panel.start_line);
    println!("  Rotation:       {:?}", display.rotation());
    println!("  I2C address:    {:#04x}", config.i2c_address);
    println!("\n{}", "Config file:".white().bold());
    print!("{}", config.to_toml_string());

    Ok(())
}

fn handle_startup(args: &PanelArgs, verbose: bool) -> Result<()> {
    let config = args.resolve()?;
    let display = start(&config)?;
    print_trace(display.interface().transactions(), verbose);
    Ok(())
}

fn handle_run(
    args: &PanelArgs,
    ops: &[Op],
    include_startup: bool,
    preview: bool,
    verbose: bool,
) -> Result<()> {
    let config = args.resolve()?;
    let mut display = start(&config)?;
    if !include_startup {
        display.interface_mut().take_transactions();
    }

    for op in ops {
        apply(&mut display, op)
            .map_err(driver_error)
            .with_context(|| format!("Operation failed: {:?}", op))?;
    }
    display.display().map_err(driver_error)?;

    print_trace(display.interface().transactions(), verbose);
    if preview {
        print_preview(&display);
    }
    Ok(())
}

fn apply(
    display: &mut Display<RecordingInterface>,
    op: &Op,
) -> std::result::Result<(), DisplayError<oled_sync::hal::InjectedFailure>> {
    match *op {
        Op::HLine(x, y, len, color) => display.draw_horizontal_run(x, y, len, color),
        Op::VLine(x, y, len, color) => display.draw_vertical_run(x, y, len, color),
        Op::Pixel(x, y, color) => display.set_pixel(x, y, color),
        Op::Rect(x, y, w, h, color) => display.fill_rect(x, y, w, h, color),
        Op::Rotate(turns) => display.set_rotation(turns),
        Op::Fill(on) => display.fill(on),
        Op::Invert(on) => display.invert_display(on),
        Op::Dim(on) => display.dim(on),
        Op::Scroll(direction, start, stop) => display.start_scroll(direction, start, stop),
        Op::StopScroll => display.stop_scroll(),
        Op::Flush => display.display(),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_trace(transactions: &[Transaction], verbose: bool) {
    let mut command_bytes = 0usize;
    let mut data_bytes = 0usize;

    for (i, transaction) in transactions.iter().enumerate() {
        match transaction {
            Transaction::Commands(bytes) => {
                command_bytes += bytes.len();
                println!("{:4} {} {}", i, "CMD ".cyan().bold(), hex(bytes));
            }
            Transaction::Data(bytes) => {
                data_bytes += bytes.len();
                println!("{:4} {} {} bytes", i, "DATA".green().bold(), bytes.len());
                if verbose {
                    for (row, chunk) in bytes.chunks(16).enumerate() {
                        println!("     {:04x}  {}", row * 16, hex(chunk).dimmed());
                    }
                }
            }
            Transaction::Release => println!("{:4} {}", i, "RELEASE".yellow().bold()),
        }
    }

    println!(
        "\n{} transactions, {} command bytes, {} data bytes",
        transactions.len().to_string().white().bold(),
        command_bytes,
        data_bytes
    );
}

fn print_preview(display: &Display<RecordingInterface>) {
    let fb = display.framebuffer();
    println!("\n{}", "Framebuffer:".white().bold());
    for y in 0..fb.height() as i32 {
        let row: String = (0..fb.width() as i32)
            .map(|x| if fb.pixel(x, y) == Some(true) { '#' } else { '.' })
            .collect();
        println!("  {}", row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ops() {
        assert!(matches!(
            "hline:0,1,16".parse::<Op>().unwrap(),
            Op::HLine(0, 1, 16, Color::White)
        ));
        assert!(matches!(
            "vline:-2,0,5@inverse".parse::<Op>().unwrap(),
            Op::VLine(-2, 0, 5, Color::Inverse)
        ));
        assert!(matches!(
            "scroll-diag-left:0,7".parse::<Op>().unwrap(),
            Op::Scroll(ScrollDirection::LeftDiagonal, 0, 7)
        ));
        assert!(matches!("flush".parse::<Op>().unwrap(), Op::Flush));
    }

    #[test]
    fn test_parse_errors() {
        assert!("hline:0,1".parse::<Op>().is_err());
        assert!("circle:1,2,3".parse::<Op>().is_err());
        assert!("pixel:1,2@red".parse::<Op>().is_err());
        assert!("scroll-up:-1,3".parse::<Op>().is_err());
    }

    #[test]
    fn test_run_ops_end_to_end() {
        let mut display = start(&DisplayConfig::new(128, 32)).unwrap();
        display.interface_mut().take_transactions();

        for op in ["pixel:0,0", "flush"] {
            apply(&mut display, &op.parse().unwrap()).unwrap();
        }
        assert_eq!(display.interface().data_blocks(), vec![&[0x01u8][..]]);
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x22, 0x00, 0xff]), "22 00 ff");
    }
}
