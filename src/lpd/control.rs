use crate::model::job::Job;
use bytes::{
    BufMut,
    Bytes,
    BytesMut,
};

/// Rendered control file. Its length goes into the control subcommand, so it is fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFile(Bytes);

impl ControlFile {
    pub fn build(job: &Job) -> Self {
        let data_file = job.data_file_name();
        let mut buf = BytesMut::new();

        put_line(&mut buf, b'H', job.host());
        put_line(&mut buf, b'P', job.user());
        put_line(&mut buf, b'l', &data_file);
        put_line(&mut buf, b'U', &data_file);
        put_line(&mut buf, b'N', job.print_name());

        Self(buf.freeze())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn bytes(&self) -> Bytes {
        self.0.clone()
    }

    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.0.split(|b| *b == b'\n').filter(|line| !line.is_empty())
    }
}

impl AsRef<[u8]> for ControlFile {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn put_line(buf: &mut BytesMut, directive: u8, value: &str) {
    buf.reserve(value.len() + 2);
    buf.put_u8(directive);
    buf.put_slice(value.as_bytes());
    buf.put_u8(b'\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::job::{
        JobRequest,
        RandomJobNumbers,
    };

    fn job(host: &str, user: &str, print_name: &str, number: u32) -> Job {
        Job::new(
            JobRequest {
                queue: "lp".to_string(),
                host: host.to_string(),
                user: user.to_string(),
                print_name: print_name.to_string(),
                job_number: Some(number),
            },
            &mut RandomJobNumbers,
        )
    }

    #[test]
    fn test_five_lines_in_order() {
        let control = ControlFile::build(&job("client1", "alice", "hello.txt", 42));
        assert_eq!(
            control.as_ref(),
            b"Hclient1\nPalice\nldfA042client1\nUdfA042client1\nNhello.txt\n"
        );

        let directives: Vec<u8> = control.lines().map(|line| line[0]).collect();
        assert_eq!(directives, b"HPlUN");
    }

    #[test]
    fn test_fields_truncated_per_line() {
        let long_host = "h".repeat(40);
        let control = ControlFile::build(&job(&long_host, &"u".repeat(40), &"n".repeat(200), 5));
        let lines: Vec<&[u8]> = control.lines().collect();

        assert_eq!(lines[0].len(), 1 + 31);
        assert_eq!(lines[1].len(), 1 + 31);
        assert_eq!(lines[2], format!("ldfA005{}", "h".repeat(15)).as_bytes());
        assert_eq!(lines[3], format!("UdfA005{}", "h".repeat(15)).as_bytes());
        assert_eq!(lines[4].len(), 1 + 131);
    }
}
