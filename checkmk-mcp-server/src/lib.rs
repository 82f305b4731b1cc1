#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::io::Result as IoResult;
use std::sync::Arc;

use mcp_types::JSONRPCMessage;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::context::AppContext;
use crate::message_processor::MessageProcessor;
use crate::outgoing_message::OutgoingMessage;
use crate::outgoing_message_sender::OutgoingMessageSender;

pub mod config;
pub mod context;
mod error_code;
mod message_processor;
mod outgoing_message;
mod outgoing_message_sender;
pub mod parameters;
pub mod request_id;
pub mod rest;
pub mod services;
pub mod tools;
pub mod util;

/// Size of the bounded channels used to communicate between tasks. The value
/// is a balance between throughput and memory usage – 128 messages should be
/// plenty for an interactive CLI.
const CHANNEL_CAPACITY: usize = 128;

/// Runs the server's three-task stdin/process/stdout pipeline to completion,
/// draining the shared [`AppContext`] on either a clean EOF or Ctrl-C
/// (spec §9: CONNECTED -> DRAINING -> EXITED).
pub async fn run_main() -> IoResult<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = config::Config::from_env().map_err(std::io::Error::other)?;
    let context = Arc::new(AppContext::new(config).map_err(std::io::Error::other)?);

    let (incoming_tx, mut incoming_rx) = mpsc::channel::<JSONRPCMessage>(CHANNEL_CAPACITY);
    let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<OutgoingMessage>(CHANNEL_CAPACITY);

    // Task: read from stdin, push to `incoming_tx`.
    let stdin_reader_handle = tokio::spawn({
        let incoming_tx = incoming_tx.clone();
        async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            while let Some(line) = lines.next_line().await.unwrap_or_default() {
                match serde_json::from_str::<JSONRPCMessage>(&line) {
                    Ok(msg) => {
                        if incoming_tx.send(msg).await.is_err() {
                            // Receiver gone – nothing left to do.
                            break;
                        }
                    }
                    Err(e) => error!("Failed to deserialize JSONRPCMessage: {e}"),
                }
            }

            debug!("stdin reader finished (EOF)");
        }
    });

    // Task: process incoming messages.
    let processor_handle = tokio::spawn({
        let outgoing_message_sender = OutgoingMessageSender::new(outgoing_tx);
        let mut processor = MessageProcessor::new(outgoing_message_sender, context.clone());
        async move {
            while let Some(msg) = incoming_rx.recv().await {
                match msg {
                    JSONRPCMessage::Request(request) => processor.process_request(request).await,
                    JSONRPCMessage::Response(_response) => {}
                    JSONRPCMessage::Notification(_notification) => {}
                    JSONRPCMessage::Error(_error) => {}
                }
            }

            info!("processor task exited (channel closed)");
        }
    });

    // Task: write outgoing messages to stdout.
    let stdout_writer_handle = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(outgoing_message) = outgoing_rx.recv().await {
            let msg: JSONRPCMessage = outgoing_message.into();
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if let Err(e) = stdout.write_all(json.as_bytes()).await {
                        error!("Failed to write to stdout: {e}");
                        break;
                    }
                    if let Err(e) = stdout.write_all(b"\n").await {
                        error!("Failed to write newline to stdout: {e}");
                        break;
                    }
                    if let Err(e) = stdout.flush().await {
                        error!("Failed to flush stdout: {e}");
                        break;
                    }
                }
                Err(e) => error!("Failed to serialize JSONRPCMessage: {e}"),
            }
        }

        info!("stdout writer exited (channel closed)");
    });

    let pipeline = async {
        let _ = tokio::join!(stdin_reader_handle, processor_handle, stdout_writer_handle);
    };

    tokio::select! {
        () = pipeline => {
            info!("pipeline finished; draining");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal; draining");
        }
    }

    context.drain().await;
    Ok(())
}
