use std::path::PathBuf;
use std::process;

use clap::Parser;

use logsort::sort::sort_file;

#[derive(Parser)]
#[command(
    name = "logsort",
    version,
    about = "Sort interleaved log lines by their timestamp text"
)]
struct Cli {
    /// Log file to sort
    #[arg(default_value = "shared_log.txt")]
    input: PathBuf,

    /// Destination for the sorted lines (overwritten wholesale)
    #[arg(default_value = "shared_log_sorted.txt")]
    output: PathBuf,
}

fn main() {
    logsort::common::reset_sigpipe();
    logsort::logging::init();

    let cli = Cli::parse();

    if let Err(e) = sort_file(&cli.input, &cli.output) {
        eprintln!("logsort: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::process::Command;

    fn cmd() -> Command {
        let mut path = std::env::current_exe().unwrap();
        path.pop();
        path.pop();
        path.push("logsort");
        Command::new(path)
    }

    #[test]
    fn test_sorts_explicit_paths() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(
            &input,
            "[2024-01-02 03:04:07.000] [info] File saved\n\
             [2024-01-02 03:04:05.000] [info] Reader process started.\n\
             [2024-01-02 03:04:06.000] [info] Writing a block #1.\n",
        )
        .unwrap();

        let status = cmd().args([&input, &output]).status().unwrap();
        assert!(status.success());

        let sorted = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            sorted,
            "[2024-01-02 03:04:05.000] [info] Reader process started.\n\
             [2024-01-02 03:04:06.000] [info] Writing a block #1.\n\
             [2024-01-02 03:04:07.000] [info] File saved\n"
        );
    }

    #[test]
    fn test_default_filenames() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("shared_log.txt"),
            "[2024-01-02 03:04:06.000] [info] b\n[2024-01-02 03:04:05.000] [info] a\n",
        )
        .unwrap();

        let status = cmd().current_dir(dir.path()).status().unwrap();
        assert!(status.success());

        let sorted = std::fs::read_to_string(dir.path().join("shared_log_sorted.txt")).unwrap();
        assert_eq!(
            sorted,
            "[2024-01-02 03:04:05.000] [info] a\n[2024-01-02 03:04:06.000] [info] b\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_input_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = cmd()
            .args(["absent.txt", "out.txt"])
            .current_dir(dir.path())
            .output()
            .unwrap();
        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("No such file"), "stderr: {}", stderr);
        assert!(!dir.path().join("out.txt").exists());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let once = dir.path().join("once.txt");
        let twice = dir.path().join("twice.txt");
        std::fs::write(
            &input,
            "[2024-01-02 03:04:05.500] [info] y\n\
             [2024-01-02 03:04:05.500] [info] z\n\
             [2024-01-02 03:04:05.100] [info] x\n",
        )
        .unwrap();

        assert!(cmd().args([&input, &once]).status().unwrap().success());
        assert!(cmd().args([&once, &twice]).status().unwrap().success());

        assert_eq!(
            std::fs::read(&once).unwrap(),
            std::fs::read(&twice).unwrap()
        );
    }

    #[test]
    fn test_short_lines_use_truncated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(
            &input,
            "[2024-01-02 03:04:05.000] [info] full line\n\nshort\n",
        )
        .unwrap();

        let status = cmd().args([&input, &output]).status().unwrap();
        assert!(status.success());

        // Keys: "" (blank line) < "2024-..." < "hort\n" (short line).
        let sorted = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            sorted,
            "\n[2024-01-02 03:04:05.000] [info] full line\nshort\n"
        );
    }

    #[test]
    fn test_unterminated_last_line_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(
            &input,
            "[2024-01-02 03:04:09.000] [info] late\n[2024-01-02 03:04:01.000] [info] early",
        )
        .unwrap();

        let status = cmd().args([&input, &output]).status().unwrap();
        assert!(status.success());

        let sorted = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            sorted,
            "[2024-01-02 03:04:01.000] [info] early[2024-01-02 03:04:09.000] [info] late\n"
        );
    }
}
