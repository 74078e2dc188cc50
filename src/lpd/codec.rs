use crate::model::job::{
    truncate_field,
    JobNumber,
    FILE_NAME_HOST_MAX,
    QUEUE_MAX,
};
use bytes::{
    Buf,
    BufMut,
    Bytes,
    BytesMut,
};
use std::io;
use tokio_util::codec::{
    Decoder,
    Encoder,
};

const RECEIVE_JOB: u8 = 0x02;
const RECEIVE_CONTROL_FILE: u8 = 0x02;
const RECEIVE_DATA_FILE: u8 = 0x03;
const LF: u8 = 0x0a;
const TERMINATOR: u8 = 0x00;

/// `\x02<queue>\n`. Queue names longer than 15 bytes are truncated.
pub fn encode_receive_job(queue: &str) -> Bytes {
    let queue = truncate_field(queue, QUEUE_MAX);
    let mut dst = BytesMut::with_capacity(queue.len() + 2);
    dst.put_u8(RECEIVE_JOB);
    dst.put_slice(queue.as_bytes());
    dst.put_u8(LF);
    dst.freeze()
}

/// `\x02<length> cfA<job><host>\n`
pub fn encode_receive_control_subcommand(length: u32, job: JobNumber, host: &str) -> Bytes {
    encode_subcommand(RECEIVE_CONTROL_FILE, "cfA", length, job, host)
}

/// `\x03<length> dfA<job><host>\n`
pub fn encode_receive_data_subcommand(length: u32, job: JobNumber, host: &str) -> Bytes {
    encode_subcommand(RECEIVE_DATA_FILE, "dfA", length, job, host)
}

fn encode_subcommand(code: u8, prefix: &str, length: u32, job: JobNumber, host: &str) -> Bytes {
    let host = truncate_field(host, FILE_NAME_HOST_MAX);
    let line = format!("{} {}{}{}", length, prefix, job, host);
    let mut dst = BytesMut::with_capacity(line.len() + 2);
    dst.put_u8(code);
    dst.put_slice(line.as_bytes());
    dst.put_u8(LF);
    dst.freeze()
}

/// The one byte a daemon answers every command with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack(u8);

impl Ack {
    pub fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    pub fn is_positive(&self) -> bool {
        self.0 == 0
    }

    pub fn code(&self) -> u8 {
        self.0
    }
}

/// Everything the client puts on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    ReceiveJob {
        queue: String,
    },
    ReceiveControlFile {
        length: u32,
        job: JobNumber,
        host: String,
    },
    ReceiveDataFile {
        length: u32,
        job: JobNumber,
        host: String,
    },
    /// Raw file bytes, written as-is.
    Content(Bytes),
    /// The zero byte closing a control or data file.
    Terminator,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct LpdCodec;

impl Encoder<Message> for LpdCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::ReceiveJob { queue } => dst.put(encode_receive_job(&queue)),
            Message::ReceiveControlFile { length, job, host } => {
                dst.put(encode_receive_control_subcommand(length, job, &host))
            }
            Message::ReceiveDataFile { length, job, host } => {
                dst.put(encode_receive_data_subcommand(length, job, &host))
            }
            Message::Content(bytes) => dst.put(bytes),
            Message::Terminator => dst.put_u8(TERMINATOR),
        }

        Ok(())
    }
}

impl Decoder for LpdCodec {
    type Error = io::Error;
    type Item = Ack;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        Ok(Some(Ack::from_byte(src.get_u8())))
    }
}
