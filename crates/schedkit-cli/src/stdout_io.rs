use std::io::{self, Write};

/// Writes to stdout, treating a closed reader (`schedkit ... | head`) as success.
pub fn write_stdout_text(text: &str) -> io::Result<()> {
    write_stdout(&[text.as_bytes()])
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    write_stdout(&[text.as_bytes(), b"\n"])
}

fn write_stdout(chunks: &[&[u8]]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for chunk in chunks {
        tolerate_broken_pipe(stdout.write_all(chunk))?;
    }
    tolerate_broken_pipe(stdout.flush())
}

fn tolerate_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
