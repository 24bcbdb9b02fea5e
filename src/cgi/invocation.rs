//! # Invocación CGI
//! src/cgi/invocation.rs
//!
//! Resolución del script y variables de entorno de un único request. Nada
//! de esto sobrevive al request: se crea al despachar y se descarta cuando
//! el hijo termina o no llega a arrancar.

use crate::error::CgiError;
use crate::http::Request;
use std::path::{Component, Path, PathBuf};

/// Configuración CGI fija durante toda la vida del servidor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiConfig {
    /// Prefijo de path que activa la ejecución (ej: `/cgi-bin/`)
    pub prefix: String,

    /// Directorio al que se concatena el path del request
    pub document_root: PathBuf,

    /// Intérprete que recibe el script como único argumento
    pub interpreter: PathBuf,
}

impl CgiConfig {
    /// ¿El path cae dentro del prefijo CGI?
    ///
    /// # Ejemplo
    /// ```
    /// use cgi_server::cgi::CgiConfig;
    ///
    /// let config = CgiConfig {
    ///     prefix: "/cgi-bin/".to_string(),
    ///     document_root: ".".into(),
    ///     interpreter: "/bin/sh".into(),
    /// };
    /// assert!(config.matches("/cgi-bin/hello.sh"));
    /// assert!(!config.matches("/index.html"));
    /// ```
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// `document_root + path`, con separadores del sistema
    ///
    /// Los segmentos vacíos y `.` se saltan; un `..` se rechaza. El script
    /// tiene que existir y ser un archivo regular.
    pub fn resolve_script(&self, path: &str) -> Result<PathBuf, CgiError> {
        let script = join_under_root(&self.document_root, path)?;
        if script.is_file() {
            Ok(script)
        } else {
            Err(CgiError::ScriptNotFound(script))
        }
    }
}

fn join_under_root(root: &Path, path: &str) -> Result<PathBuf, CgiError> {
    let mut script = root.to_path_buf();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            segment if is_plain_segment(segment) => script.push(segment),
            _ => return Err(CgiError::PathEscapesRoot(path.to_string())),
        }
    }
    Ok(script)
}

/// Un segmento que `PathBuf::push` agrega como un único nombre
///
/// `\` y `:` se rechazan en todas las plataformas: en Windows son
/// separador y prefijo de unidad.
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains(['\\', ':']) {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Datos de una ejecución concreta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiInvocation {
    pub script_path: PathBuf,
    pub method: String,
    pub query: Option<String>,
    pub script_name: String,
}

impl CgiInvocation {
    /// Resuelve el script del request contra la configuración
    pub fn prepare(config: &CgiConfig, request: &Request) -> Result<Self, CgiError> {
        let script_path = config.resolve_script(request.path())?;
        Ok(Self {
            script_path,
            method: request.method().to_string(),
            query: request.query().map(str::to_string),
            script_name: request.path().to_string(),
        })
    }

    /// Entorno propio del hijo; nunca se toca el entorno del proceso
    pub fn env_vars(&self) -> [(&'static str, &str); 3] {
        [
            ("REQUEST_METHOD", self.method.as_str()),
            ("QUERY_STRING", self.query.as_deref().unwrap_or("")),
            ("SCRIPT_NAME", self.script_name.as_str()),
        ]
    }
}
