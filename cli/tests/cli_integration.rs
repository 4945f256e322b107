// End-to-end runs of the command line tools.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::net::TcpListener;
    use std::path::PathBuf;
    use std::process::{Child, Command, Output, Stdio};
    use std::thread;
    use std::time::Duration;

    use tempfile::TempDir;

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    fn input_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("input.txt");
        let text = "the quick brown fox jumps over the lazy dog\n".repeat(2000);
        fs::write(&path, text).unwrap();
        path
    }

    fn smash(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_smash"))
            .args(args)
            .output()
            .unwrap()
    }

    fn stdout(output: &Output) -> String {
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn free_port() -> u16 {
        TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    struct Server(Child);

    impl Drop for Server {
        fn drop(&mut self) {
            let _ = self.0.kill();
            let _ = self.0.wait();
        }
    }

    // ------------------------------------------------------------
    // smash
    // ------------------------------------------------------------
    #[test]
    fn lists_available_libraries() {
        let output = smash(&["-a"]);
        assert!(output.status.success());
        let text = stdout(&output);
        for name in ["copy", "deflate", "lz4", "lz4flex", "zstd"] {
            assert!(text.contains(name), "{name} missing from {text}");
        }
    }

    #[test]
    fn prints_library_information() {
        let output = smash(&["-i", "zstd"]);
        assert!(output.status.success());
        assert!(stdout(&output).starts_with("zstd:"));

        assert!(!smash(&["-i", "brotli"]).status.success());
    }

    #[test]
    fn library_and_file_are_required() {
        let output = smash(&["-l", "3"]);
        assert!(!output.status.success());
    }

    #[test]
    fn local_run_prints_a_result_line() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_file(&dir);
        let out = dir.path().join("out.bin");

        let output = smash(&[
            "-c",
            "zstd",
            "-f",
            input.to_str().unwrap(),
            "-l",
            "3",
            "-wf",
            "40",
            "-o",
            out.to_str().unwrap(),
        ]);
        assert!(output.status.success(), "{}", stdout(&output));
        assert!(stdout(&output).contains("zstd level=3"));
        assert!(fs::metadata(&out).unwrap().len() > 0);
    }

    #[test]
    fn defaults_run_every_library() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_file(&dir);

        let output = smash(&["-c", "all", "-f", input.to_str().unwrap()]);
        assert!(output.status.success(), "{}", stdout(&output));
        let text = stdout(&output);
        assert!(!text.contains("ERROR:"));
        assert!(text.contains("lz4 level=1 mode=fast"));
    }

    #[test]
    fn invalid_options_fail_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_file(&dir);

        // lz4 high compression needs a level of at least 1
        let output = smash(&["-c", "lz4", "-f", input.to_str().unwrap(), "-l", "0", "-m", "1"]);
        assert!(!output.status.success());
        assert!(stdout(&output).contains("ERROR:"));
    }

    #[test]
    fn missing_input_file_is_reported() {
        let output = smash(&["-c", "copy", "-f", "/nonexistent/smash-input"]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read"));
    }

    // ------------------------------------------------------------
    // smash-server / smash-client
    // ------------------------------------------------------------
    #[test]
    fn client_talks_to_server() {
        let dir = tempfile::tempdir().unwrap();
        let input = input_file(&dir);
        let port = free_port().to_string();

        let _server = Server(
            Command::new(env!("CARGO_BIN_EXE_smash-server"))
                .args(["--address", "127.0.0.1", "-p", &port])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .unwrap(),
        );

        let run_client = |extra: &[&str]| -> Output {
            let mut last = None;
            for _ in 0..50 {
                let output = Command::new(env!("CARGO_BIN_EXE_smash-client"))
                    .args(["-c", "deflate", "-f", input.to_str().unwrap(), "-p", &port, "-r", "2"])
                    .args(extra)
                    .output()
                    .unwrap();
                if output.status.success() {
                    return output;
                }
                last = Some(output);
                thread::sleep(Duration::from_millis(100));
            }
            last.unwrap()
        };

        let sequential = run_client(&[]);
        assert!(sequential.status.success(), "{}", stdout(&sequential));
        assert!(stdout(&sequential).contains("deflate level=1 mode=zlib"));

        let pipelined = run_client(&["--pipeline", "--chunk_size", "8192", "--json"]);
        assert!(pipelined.status.success(), "{}", stdout(&pipelined));
        let json: serde_json::Value = serde_json::from_slice(&pipelined.stdout).unwrap();
        assert_eq!(json[0]["library"], "deflate");
        assert_eq!(json[0]["throughput"]["total"]["count"], 2);
    }
}
