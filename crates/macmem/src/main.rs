//! # macmem
//!
//! Interactive memory scanner and editor for macOS processes.
//!
//! The shell reads one command per line, dispatches it onto the session
//! façade in `macmem-core`, and prints a single-line diagnostic when a
//! command fails. All state (the attached target, the region snapshot, the
//! scan result set) lives in the session; the shell is just parsing and
//! formatting.
//!
//! Run `help` inside the shell for the command list. Attaching to other
//! processes requires root (`sudo macmem`), and System Integrity Protection
//! blocks protected system processes regardless.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use macmem_core::{platform, Address, CompareOp, MacmemError, ProcessId, Session, ValueType, WatchUpdate, RESULT_CAP};
use macmem_utils::init_logging;

/// Set by the SIGINT handler; the watch loop polls it every tick.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_interrupt(_signal: libc::c_int)
{
    INTERRUPTED.store(true, Ordering::SeqCst);
}

fn install_interrupt_handler()
{
    unsafe {
        libc::signal(
            libc::SIGINT,
            handle_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t,
        );
    }
}

fn main()
{
    // Initialize logging (reads from RUST_LOG env var)
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    install_interrupt_handler();

    println!("macmem - memory scanner for macOS");
    println!("Type 'help' for a list of commands");

    let mut shell = Shell {
        session: Session::new(),
    };
    let stdin = io::stdin();

    loop {
        INTERRUPTED.store(false, Ordering::SeqCst);
        shell.print_prompt();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("Failed to read input: {e}");
                break;
            }
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = tokens.split_first() else {
            continue;
        };

        if matches!(command, "exit" | "quit") {
            break;
        }

        if let Err(err) = shell.dispatch(command, args) {
            println!("Error: {err}");
        }
    }

    println!("Exiting macmem.");
}

struct Shell
{
    session: Session,
}

impl Shell
{
    fn print_prompt(&self)
    {
        match self.session.attached_process() {
            Some((pid, name)) => print!("{name}({pid})> "),
            None => print!("macmem> "),
        }
        let _ = io::stdout().flush();
    }

    fn dispatch(&mut self, command: &str, args: &[&str]) -> macmem_core::Result<()>
    {
        match command {
            "help" => {
                self.help();
                Ok(())
            }
            "ps" => self.list_processes(),
            "attach" => self.attach(args),
            "detach" => {
                match self.session.detach() {
                    Some(pid) => println!("Detached from process {pid}"),
                    None => println!("Not attached to any process"),
                }
                Ok(())
            }
            "info" => self.info(),
            "regions" => self.regions(),
            "scan" => self.scan(args),
            "next" => self.next(args),
            "results" => self.results(args),
            "read" => self.read(args),
            "write" => self.write(args),
            "watch" => self.watch(args),
            "save" => self.save(args),
            "load" => self.load(args),
            other => {
                println!("Unknown command: {other}. Type 'help' for a list of commands.");
                Ok(())
            }
        }
    }

    fn help(&self)
    {
        println!("Process commands:");
        println!("  ps                               - List running processes");
        println!("  attach <pid>                     - Attach to a process by ID");
        println!("  detach                           - Detach from current process");
        println!("  info                             - Show current process information");
        println!("Memory commands:");
        println!("  regions                          - List memory regions of current process");
        println!("  scan <type> <value> [op]         - First memory scan");
        println!("    Types: byte, short, int, long, float, double, string");
        println!("    Ops: exact, greater, less (default: exact)");
        println!("  next <type> <value> [op]         - Filter previous results");
        println!("    Additional ops: changed, unchanged");
        println!("  results [limit]                  - Show scan results (default limit: 20)");
        println!("  read <addr> <type>               - Read value at address");
        println!("  write <addr> <type> <value>      - Write value to address");
        println!("  watch <addr> <type> [interval]   - Watch for value changes (ms, default 1000)");
        println!("Data management:");
        println!("  save <filename>                  - Save scan results to file");
        println!("  load <filename>                  - Load scan results from file");
        println!("Misc:");
        println!("  help                             - Show this help message");
        println!("  exit, quit                       - Exit macmem");
        println!();
        println!("Attaching to other processes requires root (run with sudo).");
    }

    fn list_processes(&self) -> macmem_core::Result<()>
    {
        let processes = platform::list_processes()?;
        println!("{:<10}Process Name", "PID");
        for process in &processes {
            println!("{:<10}{}", process.pid, process.name);
        }
        println!("{} processes found", processes.len());
        Ok(())
    }

    fn attach(&mut self, args: &[&str]) -> macmem_core::Result<()>
    {
        let pid_token = required(args, 0, "pid")?;
        let pid: u32 = pid_token
            .parse()
            .map_err(|_| MacmemError::MalformedLiteral(format!("'{pid_token}' is not a valid PID")))?;

        self.session.attach(ProcessId(pid))?;
        if let Some((pid, name)) = self.session.attached_process() {
            println!("Attached to process: {name} (PID: {pid})");
        }
        if let Ok(regions) = self.session.regions() {
            println!("Found {} memory regions", regions.len());
        }
        Ok(())
    }

    fn info(&self) -> macmem_core::Result<()>
    {
        let info = self.session.info()?;
        println!("Process information:");
        println!("  Name: {}", info.name);
        println!("  PID: {}", info.pid);
        println!("  Memory regions: {}", info.region_count);
        println!("  Current scan results: {}", info.result_count);
        println!("  Total mapped: {} MB", info.mapped_bytes / (1024 * 1024));
        Ok(())
    }

    fn regions(&self) -> macmem_core::Result<()>
    {
        let regions = self.session.regions()?;
        println!(
            "{:<20}{:<20}{:<14}{:<7}Label",
            "Start", "End", "Size", "Perms"
        );
        for region in regions {
            println!(
                "{:<20}{:<20}{:<14}{:<7}{}",
                region.start.to_string(),
                region.end.to_string(),
                region.size(),
                region.permissions,
                region.label
            );
        }
        println!("{} regions", regions.len());
        Ok(())
    }

    fn scan(&mut self, args: &[&str]) -> macmem_core::Result<()>
    {
        let ty: ValueType = required(args, 0, "type")?.parse()?;
        let value = required(args, 1, "value")?;
        let op: CompareOp = match args.get(2) {
            Some(token) => token.parse()?,
            None => CompareOp::Eq,
        };

        println!("Starting first scan, please wait...");
        let outcome = self.session.first_scan(ty, value, op)?;
        if outcome.truncated {
            println!("Too many results (>{RESULT_CAP}), stopping scan");
        }
        println!("Scan complete. Found {} matches.", outcome.matches);
        Ok(())
    }

    fn next(&mut self, args: &[&str]) -> macmem_core::Result<()>
    {
        let ty: ValueType = required(args, 0, "type")?.parse()?;
        let value = required(args, 1, "value")?;
        let op: CompareOp = match args.get(2) {
            Some(token) => token.parse()?,
            None => CompareOp::Eq,
        };

        let outcome = self.session.next_scan(ty, value, op)?;
        println!(
            "Filtering complete. {} of {} addresses matched.",
            outcome.matches, outcome.examined
        );
        Ok(())
    }

    fn results(&self, args: &[&str]) -> macmem_core::Result<()>
    {
        let limit: usize = match args.first() {
            Some(token) => token
                .parse()
                .map_err(|_| MacmemError::MalformedLiteral(format!("'{token}' is not a valid limit")))?,
            None => 20,
        };

        let (rows, total) = self.session.results(limit)?;
        if total == 0 {
            println!("No scan results to display");
            return Ok(());
        }

        println!("Scan results ({total} total):");
        println!("{:<6}{:<20}{:<8}Value", "ID", "Address", "Type");
        for (id, candidate) in rows.iter().enumerate() {
            println!(
                "{:<6}{:<20}{:<8}{}",
                id,
                candidate.address.to_string(),
                candidate.ty.to_string(),
                candidate.rendered
            );
        }
        if total > rows.len() {
            println!("... and {} more results", total - rows.len());
        }
        Ok(())
    }

    fn read(&self, args: &[&str]) -> macmem_core::Result<()>
    {
        let address = Address::parse(required(args, 0, "address")?)?;
        let ty: ValueType = required(args, 1, "type")?.parse()?;

        let rendered = self.session.read_value(address, ty)?;
        println!("{address} = {rendered}");
        Ok(())
    }

    fn write(&mut self, args: &[&str]) -> macmem_core::Result<()>
    {
        let address = Address::parse(required(args, 0, "address")?)?;
        let ty: ValueType = required(args, 1, "type")?.parse()?;
        let value = required(args, 2, "value")?;

        let written = self.session.write_value(address, ty, value)?;
        println!("Wrote {written} bytes to {address}");
        Ok(())
    }

    fn watch(&self, args: &[&str]) -> macmem_core::Result<()>
    {
        let address = Address::parse(required(args, 0, "address")?)?;
        let ty: ValueType = required(args, 1, "type")?.parse()?;
        let interval_ms: u64 = match args.get(2) {
            Some(token) => token
                .parse()
                .map_err(|_| MacmemError::MalformedLiteral(format!("'{token}' is not a valid interval")))?,
            None => 1000,
        };

        println!("Watching {address} ({ty}), press Ctrl+C to stop");
        INTERRUPTED.store(false, Ordering::SeqCst);

        let changes = self
            .session
            .watch(address, ty, Duration::from_millis(interval_ms), &INTERRUPTED, |update| {
                match update {
                    WatchUpdate::Initial(value) => println!("Initial value: {value}"),
                    WatchUpdate::Changed { sequence, old, new } => {
                        println!("Change detected (#{sequence}): {old} → {new}");
                    }
                }
            })?;

        println!("Watch stopped after {changes} changes");
        Ok(())
    }

    fn save(&self, args: &[&str]) -> macmem_core::Result<()>
    {
        let filename = required(args, 0, "filename")?;
        let count = self.session.save(Path::new(filename))?;
        println!("Saved {count} results to {filename}");
        Ok(())
    }

    fn load(&mut self, args: &[&str]) -> macmem_core::Result<()>
    {
        let filename = required(args, 0, "filename")?;
        let count = self.session.load(Path::new(filename))?;
        println!("Loaded {count} results from {filename}");
        Ok(())
    }
}

fn required<'a>(args: &[&'a str], index: usize, name: &'static str) -> macmem_core::Result<&'a str>
{
    args.get(index).copied().ok_or(MacmemError::MissingArgument(name))
}
