use crate::{
    error::{
        LpdError,
        Result,
        Step,
    },
    lpd::{
        codec::{
            LpdCodec,
            Message,
        },
        control::ControlFile,
        transmit::{
            transmit,
            with_timeout,
            DataPayload,
            DEFAULT_CHUNK_SIZE,
        },
    },
    model::job::{
        Job,
        JobNumber,
        JobNumberSource,
        JobRequest,
    },
};
use futures::SinkExt;
use log::{
    debug,
    info,
};
use std::time::Duration;
use tokio::io::{
    AsyncRead,
    AsyncWrite,
};
use tokio_stream::StreamExt;
use tokio_util::codec::Framed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    JobOpened,
    ControlSent,
    DataSent,
    Complete,
    Failed,
}

/// What was handed to the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub job_number: JobNumber,
    pub control_file: String,
    pub data_file: String,
    pub control_len: usize,
    pub data_len: u32,
}

/// One job over one connection. The session owns the stream until it is dropped.
pub struct JobSession<T> {
    framed: Framed<T, LpdCodec>,
    job: Job,
    state: SessionState,
    chunk_size: usize,
    io_timeout: Option<Duration>,
}

impl<T> JobSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(transport: T, request: JobRequest, numbers: &mut impl JobNumberSource) -> Self {
        Self {
            framed: Framed::new(transport, LpdCodec),
            job: Job::new(request, numbers),
            state: SessionState::Idle,
            chunk_size: DEFAULT_CHUNK_SIZE,
            io_timeout: None,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Bound every write and every acknowledgement wait. Without it a silent daemon stalls forever.
    pub fn with_timeout(mut self, io_timeout: Option<Duration>) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub fn into_inner(self) -> T {
        self.framed.into_inner()
    }

    /// Runs the whole exchange. The first failure leaves the session `Failed` and nothing more is
    /// written; a session is never run twice.
    pub async fn submit<R>(&mut self, mut payload: DataPayload<R>) -> Result<Receipt>
    where
        R: AsyncRead + Unpin,
    {
        if self.state != SessionState::Idle {
            return Err(LpdError::SessionFinished);
        }

        match self.run(&mut payload).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    async fn run<R>(&mut self, payload: &mut DataPayload<R>) -> Result<Receipt>
    where
        R: AsyncRead + Unpin,
    {
        self.open_job().await?;
        self.state = SessionState::JobOpened;

        let control_len = self.send_control_file().await?;
        self.state = SessionState::ControlSent;

        self.send_data_file(payload).await?;
        self.state = SessionState::DataSent;

        self.state = SessionState::Complete;
        Ok(Receipt {
            job_number: self.job.number(),
            control_file: self.job.control_file_name(),
            data_file: self.job.data_file_name(),
            control_len,
            data_len: payload.len(),
        })
    }

    async fn open_job(&mut self) -> Result<()> {
        debug!("receive job: {}", self.job.queue());

        let queue = self.job.queue().to_string();
        self.send(Step::ReceiveJob, Message::ReceiveJob { queue }).await?;
        self.await_ack(Step::ReceiveJob).await
    }

    async fn send_control_file(&mut self) -> Result<usize> {
        let control = ControlFile::build(&self.job);
        let length = control.len() as u32;

        debug!(
            "receive control file: {} {}",
            length,
            self.job.control_file_name()
        );
        for line in control.lines() {
            debug!("  {}", String::from_utf8_lossy(line));
        }

        let command = Message::ReceiveControlFile {
            length,
            job: self.job.number(),
            host: self.job.file_name_host().to_string(),
        };
        self.send(Step::ControlCommand, command).await?;
        self.await_ack(Step::ControlCommand).await?;

        self.feed(Step::ControlFile, Message::Content(control.bytes())).await?;
        self.send(Step::ControlFile, Message::Terminator).await?;
        self.await_ack(Step::ControlFile).await?;

        Ok(control.len())
    }

    async fn send_data_file<R>(&mut self, payload: &mut DataPayload<R>) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let length = payload.len();
        info!(
            job = self.job.number().value(), bytes = length;
            "send {} bytes, {}",
            length,
            self.job.data_file_name()
        );

        let command = Message::ReceiveDataFile {
            length,
            job: self.job.number(),
            host: self.job.file_name_host().to_string(),
        };
        self.send(Step::DataCommand, command).await?;
        self.await_ack(Step::DataCommand).await?;

        transmit(&mut self.framed, payload, self.chunk_size, self.io_timeout).await?;
        self.await_ack(Step::DataFile).await
    }

    async fn feed(&mut self, step: Step, message: Message) -> Result<()> {
        let limit = self.io_timeout;
        let write = async {
            self.framed
                .feed(message)
                .await
                .map_err(|e| LpdError::transport(step, e))
        };
        with_timeout(limit, step, write).await
    }

    async fn send(&mut self, step: Step, message: Message) -> Result<()> {
        let limit = self.io_timeout;
        let write = async {
            self.framed
                .send(message)
                .await
                .map_err(|e| LpdError::transport(step, e))
        };
        with_timeout(limit, step, write).await
    }

    async fn await_ack(&mut self, step: Step) -> Result<()> {
        let limit = self.io_timeout;
        let read = async {
            match self.framed.next().await {
                Some(Ok(ack)) if ack.is_positive() => Ok(()),
                Some(Ok(ack)) => Err(LpdError::ProtocolRejected {
                    step,
                    code: ack.code(),
                }),
                Some(Err(e)) => Err(LpdError::transport(step, e)),
                None => Err(LpdError::ShortRead { step }),
            }
        };
        with_timeout(limit, step, read).await
    }
}
