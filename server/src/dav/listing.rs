//! PROPFIND multistatus parsing
//!
//! The reply is read into a fixed raw shape first (`Multistatus`), where
//! every `response` and `propstat` node is collected into a Vec. A server
//! that sends a single child therefore yields a length-1 sequence, never a
//! scalar. Classification into a [`Listing`] happens on that raw shape.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use thiserror::Error;

const STATUS_NOT_FOUND: u16 = 404;
const STATUS_MULTI_STATUS: u16 = 207;

/// One child of the album collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumEntry {
    /// Server-relative path, as sent by the server
    pub href: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Never empty
    Entries(Vec<AlbumEntry>),
    NotFound,
    Empty,
    Unexpected(String),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("missing multistatus root element")]
    MissingRoot,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Multistatus {
    pub responses: Vec<RawResponse>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub href: Option<String>,
    pub propstats: Vec<RawPropstat>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RawPropstat {
    pub status: Option<String>,
    pub content_type: Option<String>,
}

impl RawResponse {
    /// First non-empty `getcontenttype` across the propstats
    fn content_type(&self) -> Option<String> {
        self.propstats
            .iter()
            .filter_map(|p| p.content_type.as_deref())
            .map(str::trim)
            .find(|ct| !ct.is_empty())
            .map(str::to_string)
    }
}

/// Classify a listing reply from its status code and body
pub fn parse_listing(status: u16, body: &str) -> Listing {
    if status == STATUS_NOT_FOUND {
        return Listing::NotFound;
    }
    if status != STATUS_MULTI_STATUS {
        return Listing::Unexpected(format!("non-207 status {}", status));
    }

    match parse_multistatus(body) {
        Ok(multistatus) => classify(multistatus),
        Err(e) => Listing::Unexpected(format!("malformed multistatus: {}", e)),
    }
}

fn classify(multistatus: Multistatus) -> Listing {
    let responses = multistatus.responses;

    match responses.len() {
        0 => Listing::Empty,
        // Only the collection itself came back
        1 => {
            let status = responses[0]
                .propstats
                .first()
                .and_then(|p| p.status.as_deref())
                .map(str::trim);
            match status {
                Some(s) if s.ends_with("404 Not Found") => Listing::Empty,
                _ => Listing::Unexpected("error listing album".to_string()),
            }
        }
        _ => {
            let entries: Vec<AlbumEntry> = responses
                .iter()
                .filter_map(|r| {
                    let href = r.href.as_deref().map(str::trim).filter(|h| !h.is_empty());
                    if href.is_none() {
                        tracing::debug!("skipping multistatus response without href");
                    }
                    href.map(|href| AlbumEntry {
                        href: href.to_string(),
                        content_type: r.content_type(),
                    })
                })
                .collect();

            if entries.is_empty() {
                Listing::Empty
            } else {
                Listing::Entries(entries)
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Node {
    Multistatus,
    Response,
    Href,
    Propstat,
    Prop,
    ContentType,
    Status,
    Other,
}

impl Node {
    fn from_local_name(name: &[u8]) -> Self {
        match name {
            b"multistatus" => Node::Multistatus,
            b"response" => Node::Response,
            b"href" => Node::Href,
            b"propstat" => Node::Propstat,
            b"prop" => Node::Prop,
            b"getcontenttype" => Node::ContentType,
            b"status" => Node::Status,
            _ => Node::Other,
        }
    }
}

/// Read a multistatus document into its raw shape.
///
/// Elements are matched on their local name, so `d:`, `D:` or any other
/// prefix bound to `DAV:` is accepted.
pub fn parse_multistatus(body: &str) -> Result<Multistatus, ParseError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut out = Multistatus::default();
    let mut stack: Vec<Node> = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let node = Node::from_local_name(e.local_name().as_ref());
                open_node(&mut out, &stack, node, &mut saw_root);
                stack.push(node);
            }
            Event::Empty(e) => {
                let node = Node::from_local_name(e.local_name().as_ref());
                open_node(&mut out, &stack, node, &mut saw_root);
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                push_text(&mut out, &stack, &text);
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t).into_owned();
                push_text(&mut out, &stack, &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(ParseError::MissingRoot);
    }

    Ok(out)
}

fn open_node(out: &mut Multistatus, stack: &[Node], node: Node, saw_root: &mut bool) {
    let parent = stack.last().copied();
    match (parent, node) {
        (None, Node::Multistatus) => *saw_root = true,
        (Some(Node::Multistatus), Node::Response) => out.responses.push(RawResponse::default()),
        (Some(Node::Response), Node::Propstat) => {
            if let Some(resp) = out.responses.last_mut() {
                resp.propstats.push(RawPropstat::default());
            }
        }
        _ => {}
    }
}

fn push_text(out: &mut Multistatus, stack: &[Node], text: &str) {
    let Some(resp) = out.responses.last_mut() else {
        return;
    };

    match stack {
        [.., Node::Response, Node::Href] => append(&mut resp.href, text),
        [.., Node::Propstat, Node::Status] => {
            if let Some(ps) = resp.propstats.last_mut() {
                append(&mut ps.status, text);
            }
        }
        [.., Node::Propstat, Node::Prop, Node::ContentType] => {
            if let Some(ps) = resp.propstats.last_mut() {
                append(&mut ps.content_type, text);
            }
        }
        _ => {}
    }
}

fn append(slot: &mut Option<String>, text: &str) {
    slot.get_or_insert_with(String::new).push_str(text);
}
