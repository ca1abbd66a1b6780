use crate::error::Error;
use strum::{AsRefStr, EnumString};

///
/// Commands of the subset of STOMP 1.2 spoken with the backend.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, EnumString)]
pub enum Command {
    #[strum(serialize = "CONNECT")]
    Connect,
    #[strum(serialize = "CONNECTED")]
    Connected,
    #[strum(serialize = "SUBSCRIBE")]
    Subscribe,
    #[strum(serialize = "UNSUBSCRIBE")]
    Unsubscribe,
    #[strum(serialize = "MESSAGE")]
    Message,
    #[strum(serialize = "ERROR")]
    Error,
    #[strum(serialize = "DISCONNECT")]
    Disconnect,
}

///
/// A single STOMP frame: command line, `key:value` header lines, blank
/// line, body, NUL terminator.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    ///
    /// First header with the given name, the way STOMP resolves repeats.
    ///
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header_name, _)| header_name == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn encode(&self) -> String {
        let mut text = String::new();
        text.push_str(self.command.as_ref());
        text.push('\n');
        for (name, value) in &self.headers {
            text.push_str(name);
            text.push(':');
            text.push_str(value);
            text.push('\n');
        }
        text.push('\n');
        text.push_str(&self.body);
        text.push('\0');

        text
    }

    pub fn decode(text: &str) -> Result<Self, Error> {
        let text = text.strip_suffix('\0').unwrap_or(text);
        let (head, body) = text
            .split_once("\n\n")
            .ok_or_else(|| Error::Decode("frame has no header/body separator".to_string()))?;

        let mut lines = head.lines();
        let command_line = lines
            .next()
            .ok_or_else(|| Error::Decode("frame is empty".to_string()))?;
        let command = command_line
            .parse::<Command>()
            .map_err(|_| Error::Decode(format!("unknown command: {command_line}")))?;

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| Error::Decode(format!("malformed header line: {line}")))?;
            headers.push((name.to_string(), value.to_string()));
        }

        Ok(Self {
            command,
            headers,
            body: body.to_string(),
        })
    }
}
