//! # Ejecución CGI
//!
//! Todo request cuyo path empieza con el prefijo configurado se resuelve a
//! un script bajo el document root y se ejecuta con un intérprete externo.
//! El proceso recibe la metadata del request en su propio entorno:
//!
//! | Variable         | Valor                          |
//! |------------------|--------------------------------|
//! | `REQUEST_METHOD` | método de la request line      |
//! | `QUERY_STRING`   | texto tras el `?` (o vacío)    |
//! | `SCRIPT_NAME`    | path del request               |
//!
//! El stdout del hijo es la respuesta completa que ve el cliente.

pub mod executor;
pub mod invocation;

pub use executor::{CgiExecutor, CgiOutcome};
pub use invocation::{CgiConfig, CgiInvocation};
