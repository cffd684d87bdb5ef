//! Interactive terminal client for the retrieval-augmented chat backend.
//!
//! This binary logs in, holds one chat stream open, and prints each chat
//! turn as it arrives.  In the extended profile it can also upload text to
//! the backend's knowledge store.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! ragchat
//!
//! # Talk to a local backend with the minimal front-end behavior
//! ragchat --base-url http://localhost:8000 --profile minimal
//!
//! # Disable colors (useful for piping output)
//! ragchat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/mode context|rag` - Change the answering mode
//! - `/kb` - Open or close the knowledge panel
//! - `/kb send` - Upload the knowledge text
//! - `/status` - Show connection status
//! - `/quit` - Exit the application
//!
//! While the knowledge panel is open, only `/kb ...`, `/help`, and `/quit`
//! are commands; start a line with `//` to add a literal `/`.

use std::sync::mpsc as std_mpsc;
use std::thread;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::Instant;

use ragchat::chat::{
    ChatArgs, ChatClient, ChatCommand, ChatConfig, ClientStatus, PlainTextRenderer, Renderer,
    KnowledgeInput, UploadOutcome, View, help_text, parse_command, parse_knowledge_input,
    render_transcript,
};
use ragchat::{Backend, Connector, HttpBackend, SendOutcome, WebSocketConnector};

/// A line request for the editor thread.
struct Prompt {
    text: String,
    history: bool,
}

/// What the editor thread read.
enum Input {
    Line(String),
    Interrupted,
    Eof,
    Failed(String),
}

/// Reads lines on a dedicated thread so the main task can keep receiving
/// stream events while the user types.
struct LineReader {
    requests: std_mpsc::Sender<Prompt>,
    lines: UnboundedReceiver<Input>,
    outstanding: bool,
}

impl LineReader {
    fn spawn() -> Result<Self, Box<dyn std::error::Error>> {
        let (requests, prompts) = std_mpsc::channel::<Prompt>();
        let (lines_tx, lines): (UnboundedSender<Input>, _) = unbounded_channel();
        let (ready_tx, ready) = std_mpsc::channel::<Result<(), String>>();
        thread::spawn(move || {
            let mut editor = match DefaultEditor::new() {
                Ok(editor) => {
                    let _ = ready_tx.send(Ok(()));
                    editor
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err.to_string()));
                    return;
                }
            };
            while let Ok(prompt) = prompts.recv() {
                let input = match editor.readline(&prompt.text) {
                    Ok(line) => {
                        if prompt.history && !line.trim().is_empty() {
                            let _ = editor.add_history_entry(line.as_str());
                        }
                        Input::Line(line)
                    }
                    Err(ReadlineError::Interrupted) => Input::Interrupted,
                    Err(ReadlineError::Eof) => Input::Eof,
                    Err(err) => Input::Failed(err.to_string()),
                };
                if lines_tx.send(input).is_err() {
                    break;
                }
            }
        });
        ready
            .recv()
            .map_err(|_| "line editor thread exited")?
            .map_err(|err| format!("cannot start line editor: {err}"))?;
        Ok(Self {
            requests,
            lines,
            outstanding: false,
        })
    }

    /// Ask for a line unless one is already being read.
    fn request(&mut self, text: &str, history: bool) {
        if self.outstanding {
            return;
        }
        let prompt = Prompt {
            text: text.to_string(),
            history,
        };
        self.outstanding = self.requests.send(prompt).is_ok();
    }

    async fn recv(&mut self) -> Input {
        let input = self.lines.recv().await.unwrap_or(Input::Eof);
        self.outstanding = false;
        input
    }

    async fn read(&mut self, text: &str, history: bool) -> Input {
        self.request(text, history);
        self.recv().await
    }
}

/// One turn of the chat view's event loop.
enum Step {
    Input(Input),
    Event,
    CloseKnowledge,
}

/// Main entry point for the ragchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("ragchat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if config.verbose {
        if let Ok(parsed) = "ragchat=debug".parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let backend = HttpBackend::new(config.endpoints()?)?;
    let mut client = ChatClient::from_config(backend, WebSocketConnector, &config)?;
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut reader = LineReader::spawn()?;

    println!("RAG Chat ({} profile, {})", config.profile, config.base_url);
    println!("Type /help for commands, /quit to exit\n");

    let mut username = config.username.clone();

    loop {
        if client.view() == View::Login {
            if !login_step(&mut client, &mut reader, &mut renderer, &mut username).await {
                break;
            }
            render_transcript(&mut renderer, client.transcript_mut());
            continue;
        }

        let prompt = if client.knowledge().is_open() {
            "KB> "
        } else {
            "You: "
        };
        reader.request(prompt, true);
        let close_at = client.knowledge_close_deadline();
        let step = tokio::select! {
            input = reader.recv() => Step::Input(input),
            _ = client.next_event(), if client.is_streaming() => Step::Event,
            _ = tokio::time::sleep_until(close_at.unwrap_or_else(Instant::now)),
                if close_at.is_some() => Step::CloseKnowledge,
        };

        match step {
            Step::Input(Input::Line(line)) => {
                if client.knowledge().is_open() {
                    match parse_knowledge_input(&line) {
                        KnowledgeInput::Command(ChatCommand::Quit) => break,
                        KnowledgeInput::Command(cmd) => {
                            handle_command(cmd, &mut client, &mut renderer).await;
                        }
                        KnowledgeInput::Text(text) => {
                            client.knowledge_mut().push_line(&text);
                            renderer.print_knowledge(client.knowledge());
                        }
                    }
                } else if let Some(cmd) = parse_command(line.trim()) {
                    if let ChatCommand::Quit = cmd {
                        break;
                    }
                    handle_command(cmd, &mut client, &mut renderer).await;
                } else {
                    match client.send_message(&line).await {
                        Ok(SendOutcome::Dropped) if !line.trim().is_empty() => {
                            renderer.print_error("Not connected; message not sent.");
                        }
                        Ok(_) => {}
                        Err(err) => renderer.print_error(&err.to_string()),
                    }
                }
            }
            Step::Input(Input::Interrupted) => {
                println!();
            }
            Step::Input(Input::Eof) => {
                break;
            }
            Step::Input(Input::Failed(err)) => {
                renderer.print_error(&format!("Input error: {err}"));
                break;
            }
            Step::Event => {}
            Step::CloseKnowledge => {
                if client.close_knowledge_if_due() {
                    renderer.print_info("Knowledge panel closed.");
                }
            }
        }
        render_transcript(&mut renderer, client.transcript_mut());
    }

    client.shutdown().await;
    println!("\nGoodbye!");
    Ok(())
}

/// Prompt for credentials and attempt one login.
///
/// Returns false when the user asked to leave.
async fn login_step<B: Backend, C: Connector>(
    client: &mut ChatClient<B, C>,
    reader: &mut LineReader,
    renderer: &mut PlainTextRenderer,
    prefill: &mut Option<String>,
) -> bool {
    if let Some(error) = client.login_error() {
        renderer.print_error(error);
    }
    let username = match prefill.take() {
        Some(username) => username,
        None => match reader.read("Username: ", true).await {
            Input::Line(line) => line,
            input => return leave_login(client, renderer, input),
        },
    };
    let password = match reader.read("Password: ", false).await {
        Input::Line(line) => line,
        input => return leave_login(client, renderer, input),
    };
    if client.login(&username, &password).await.is_ok() {
        renderer.print_info("Logged in.");
    }
    true
}

/// Handle anything but a line at the login prompts.
fn leave_login<B: Backend, C: Connector>(
    client: &mut ChatClient<B, C>,
    renderer: &mut PlainTextRenderer,
    input: Input,
) -> bool {
    match input {
        Input::Line(_) | Input::Interrupted => {
            println!();
            true
        }
        Input::Eof => client.resume_chat(),
        Input::Failed(err) => {
            renderer.print_error(&format!("Input error: {err}"));
            false
        }
    }
}

async fn handle_command<B: Backend, C: Connector>(
    cmd: ChatCommand,
    client: &mut ChatClient<B, C>,
    renderer: &mut PlainTextRenderer,
) {
    match cmd {
        ChatCommand::Mode(mode) => {
            client.set_mode(mode);
            renderer.print_info(&format!("Mode set to {mode}."));
        }
        ChatCommand::ShowMode => {
            renderer.print_info(&format!("Mode: {}", client.mode()));
        }
        ChatCommand::ToggleKnowledge => {
            if !client.profile().allows_upload() {
                renderer.print_error("Knowledge uploads are not available in this profile.");
            } else if client.knowledge().is_open() {
                client.knowledge_mut().close();
                renderer.print_info("Knowledge panel closed.");
            } else {
                client.knowledge_mut().open();
                renderer.print_info(
                    "Knowledge panel open. Lines you type are added to the knowledge text; \
                     /kb send uploads it, /kb cancel closes the panel.",
                );
                renderer.print_knowledge(client.knowledge());
            }
        }
        ChatCommand::SendKnowledge => match client.upload_knowledge().await {
            UploadOutcome::Unavailable => {
                renderer.print_error("Knowledge uploads are not available in this profile.");
            }
            UploadOutcome::Updated { .. } | UploadOutcome::Empty | UploadOutcome::Failed => {
                renderer.print_knowledge(client.knowledge());
            }
        },
        ChatCommand::CancelKnowledge => {
            client.knowledge_mut().close();
            renderer.print_info("Knowledge panel closed.");
        }
        ChatCommand::Clear => {
            client.clear_transcript();
            renderer.print_info("Transcript cleared.");
        }
        ChatCommand::Status => {
            print_status(&client.status(), &renderer.badge(client.knowledge()));
        }
        ChatCommand::Login => {
            client.begin_relogin();
        }
        ChatCommand::Help => {
            for line in help_text().lines() {
                println!("    {}", line);
            }
        }
        ChatCommand::Quit => {}
        ChatCommand::Invalid(message) => {
            renderer.print_error(&message);
        }
    }
}

fn print_status(status: &ClientStatus, badge: &str) {
    println!("    Status:");
    println!("      Profile: {}", status.profile);
    println!("      Frame validation: {:?}", status.validation);
    println!("      Mode: {}", status.mode);
    match status.stream {
        Some(state) => println!("      Stream: {state}"),
        None => println!("      Stream: not connected"),
    }
    println!("      Logged in: {}", if status.logged_in { "yes" } else { "no" });
    println!("      Knowledge: {badge}");
    println!("      Transcript entries: {}", status.transcript_len);
}
