use rand::Rng;
use std::fmt::Display;

pub const QUEUE_MAX: usize = 15;
pub const HOST_MAX: usize = 31;
pub const USER_MAX: usize = 31;
pub const PRINT_NAME_MAX: usize = 131;
/// Width of the host inside `cfA`/`dfA` file names.
pub const FILE_NAME_HOST_MAX: usize = 15;

/// Cut `value` to at most `max` bytes without splitting a character.
pub fn truncate_field(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Three digit job number. Anything given is reduced modulo 1000, even values already in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobNumber(u16);

impl JobNumber {
    pub fn new(raw: u32) -> Self {
        Self((raw % 1000) as u16)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl Display for JobNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Where job numbers come from when the caller doesn't pick one.
pub trait JobNumberSource {
    fn next_job_number(&mut self) -> JobNumber;
}

#[derive(Debug, Default)]
pub struct RandomJobNumbers;

impl JobNumberSource for RandomJobNumbers {
    fn next_job_number(&mut self) -> JobNumber {
        JobNumber::new(rand::thread_rng().gen_range(0..1000))
    }
}

/// What the caller asks for. The session turns it into a [`Job`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub queue: String,
    pub host: String,
    pub user: String,
    pub print_name: String,
    pub job_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    queue: String,
    number: JobNumber,
    host: String,
    user: String,
    print_name: String,
}

impl Job {
    pub fn new(request: JobRequest, numbers: &mut impl JobNumberSource) -> Self {
        let number = match request.job_number {
            Some(raw) => JobNumber::new(raw),
            None => numbers.next_job_number(),
        };

        Self {
            queue: request.queue,
            number,
            host: request.host,
            user: request.user,
            print_name: request.print_name,
        }
    }

    pub fn number(&self) -> JobNumber {
        self.number
    }

    pub fn queue(&self) -> &str {
        truncate_field(&self.queue, QUEUE_MAX)
    }

    pub fn host(&self) -> &str {
        truncate_field(&self.host, HOST_MAX)
    }

    pub fn user(&self) -> &str {
        truncate_field(&self.user, USER_MAX)
    }

    pub fn print_name(&self) -> &str {
        truncate_field(&self.print_name, PRINT_NAME_MAX)
    }

    /// Host as it appears inside file names.
    pub fn file_name_host(&self) -> &str {
        truncate_field(&self.host, FILE_NAME_HOST_MAX)
    }

    pub fn control_file_name(&self) -> String {
        format!("cfA{}{}", self.number, self.file_name_host())
    }

    pub fn data_file_name(&self) -> String {
        format!("dfA{}{}", self.number, self.file_name_host())
    }
}

#[cfg(test)]
pub struct FixedJobNumbers(pub u32);

#[cfg(test)]
impl JobNumberSource for FixedJobNumbers {
    fn next_job_number(&mut self) -> JobNumber {
        JobNumber::new(self.0)
    }
}
