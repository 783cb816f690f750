use std::io;
use std::path::Path;
use std::process::Command;

/// Hands a generated file or folder to the desktop. Invoked by callers after
/// a document is written; rendering never does this itself.
pub trait Opener {
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// Opens paths with the platform's default handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> io::Result<()> {
        let status = open_command(path).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "opening {} exited with {status}",
                path.display()
            )))
        }
    }
}

fn open_command(path: &Path) -> Command {
    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    }

    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}
