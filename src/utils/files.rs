use std::path::Path;

use tokio::{
    fs::File,
    io::{self, AsyncBufReadExt, Split},
};

/// Read a file from the given path into a list of lines. A line that is not valid UTF-8 is
/// kept in place as `None`, so line numbers stay aligned.
pub async fn read_file(path: &Path) -> io::Result<Vec<Option<String>>> {
    let mut r = file_reader(path).await?;
    let mut lines = Vec::new();

    while let Some(mut line) = r.next_segment().await? {
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        lines.push(String::from_utf8(line).ok());
    }

    Ok(lines)
}

async fn file_reader(path: &Path) -> io::Result<Split<io::BufReader<File>>> {
    let f = File::open(path).await?;

    Ok(io::BufReader::new(f).split(b'\n'))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn keeps_undecodable_lines_in_place() {
        let path =
            std::env::temp_dir().join(format!("sentiment-bench-lines-{}", std::process::id()));
        fs::write(&path, b"first\r\nbad \xff\xfe line\nlast").unwrap();

        let lines = read_file(&path).await.unwrap();

        assert_eq!(
            lines,
            vec![Some("first".to_string()), None, Some("last".to_string())]
        );

        fs::remove_file(path).unwrap();
    }
}
