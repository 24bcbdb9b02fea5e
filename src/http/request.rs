//! # Parsing de la Request Line
//! src/http/request.rs
//!
//! Solo se interpreta la primera línea del request:
//!
//! ```text
//! GET /cgi-bin/hello.sh?name=world HTTP/1.1\r\n
//! ^^^ ^^^^^^^^^^^^^^^^^ ^^^^^^^^^^
//! |   |                 query
//! |   path
//! method
//! ```
//!
//! Headers, body y versión HTTP se ignoran por completo.

use crate::error::ParseError;
use std::io::Read;

/// Request line parseada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método tal como llegó (no se valida)
    method: String,

    /// Parte del URI anterior al primer `?`
    path: String,

    /// Parte posterior al primer `?`, si existe
    query: Option<String>,
}

impl Request {
    /// Parsea una request line ya aislada (sin `\r\n`)
    ///
    /// # Ejemplo
    /// ```
    /// use cgi_server::http::Request;
    ///
    /// let request = Request::parse_line("GET /cgi-bin/x?y=1 HTTP/1.1").unwrap();
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.path(), "/cgi-bin/x");
    /// assert_eq!(request.query(), Some("y=1"));
    /// ```
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let mut tokens = line.split(' ').filter(|token| !token.is_empty());

        let method = tokens.next().ok_or(ParseError::EmptyRequestLine)?;
        let uri = tokens.next().unwrap_or("/");

        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (uri, None),
        };

        Ok(Self {
            method: method.to_string(),
            path: path.to_string(),
            query,
        })
    }

    /// Parsea la primera línea no vacía de un buffer crudo
    ///
    /// Las líneas vacías previas al request line se ignoran; una línea con
    /// solo espacios sí cuenta como request line (vacío).
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let text = String::from_utf8_lossy(buffer);
        let line = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .find(|line| !line.is_empty())
            .unwrap_or("");
        Self::parse_line(line)
    }

    /// Lee del stream hasta completar la primera línea y la parsea
    ///
    /// Acumula lecturas hasta ver `\n` o EOF. Si se juntan más de
    /// `max_len` bytes sin fin de línea retorna `LineTooLong` en vez de
    /// truncar.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R, max_len: usize) -> Result<Self, ParseError> {
        let line = read_request_line(reader, max_len)?;
        Self::parse(&line)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

/// Acumula bytes hasta la primera línea completa
///
/// Retorna la línea sin el terminador. Los `\r`/`\n` previos a la línea
/// se saltan y lo que venga después del `\n` (headers, body) se descarta.
/// El límite `max_len` no cuenta el terminador, sea `\n` o `\r\n`.
pub fn read_request_line<R: Read + ?Sized>(reader: &mut R, max_len: usize) -> Result<Vec<u8>, ParseError> {
    let mut buffer: Vec<u8> = Vec::with_capacity(max_len.min(4096));
    let mut chunk = vec![0u8; max_len.max(1)];
    let mut skipped = 0usize;

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ParseError::Io(e)),
        };

        if n == 0 {
            if buffer.is_empty() {
                return Err(ParseError::ConnectionClosed);
            }
            // EOF sin terminador: la línea es lo que haya llegado
            if line_len(&buffer) > max_len {
                return Err(ParseError::LineTooLong { max: max_len });
            }
            return Ok(buffer);
        }

        let mut data = &chunk[..n];
        if buffer.is_empty() {
            let blank = data.iter().take_while(|&&b| b == b'\r' || b == b'\n').count();
            skipped += blank;
            if skipped > max_len {
                return Err(ParseError::LineTooLong { max: max_len });
            }
            data = &data[blank..];
            if data.is_empty() {
                continue;
            }
        }

        let scan_from = buffer.len();
        buffer.extend_from_slice(data);

        if let Some(pos) = buffer[scan_from..].iter().position(|&b| b == b'\n') {
            buffer.truncate(scan_from + pos);
            if buffer.last() == Some(&b'\r') {
                buffer.pop();
            }
            if buffer.len() > max_len {
                return Err(ParseError::LineTooLong { max: max_len });
            }
            return Ok(buffer);
        }

        if line_len(&buffer) > max_len {
            return Err(ParseError::LineTooLong { max: max_len });
        }
    }
}

/// Largo de la línea sin un `\r` final que puede ser parte del terminador
fn line_len(buffer: &[u8]) -> usize {
    buffer.len() - usize::from(buffer.last() == Some(&b'\r'))
}
