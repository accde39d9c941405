//! Closed set of MySQL dissectors.

use super::{
    MysqlEof, MysqlErr, MysqlInitDb, MysqlOk, MysqlPing, MysqlPrepare, MysqlQuery, MysqlQuit,
    MysqlRequest, MysqlResponse, MysqlStmtClose,
};
use crate::dissect::{CommandDissector, Verdict};
use crate::message::PayloadMessage;

/// Enum of all MySQL command dissectors.
///
/// This enables static dispatch (no vtable overhead) in the pipelines.
#[derive(Debug, Clone)]
pub enum MysqlCommand {
    Request(MysqlRequest),
    Prepare(MysqlPrepare),
    Query(MysqlQuery),
    Quit(MysqlQuit),
    InitDb(MysqlInitDb),
    Ping(MysqlPing),
    StmtClose(MysqlStmtClose),
    Response(MysqlResponse),
    Ok(MysqlOk),
    Err(MysqlErr),
    Eof(MysqlEof),
}

/// Macro to delegate CommandDissector methods to inner types.
macro_rules! delegate_dissector {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            MysqlCommand::Request(d) => d.$method($($arg),*),
            MysqlCommand::Prepare(d) => d.$method($($arg),*),
            MysqlCommand::Query(d) => d.$method($($arg),*),
            MysqlCommand::Quit(d) => d.$method($($arg),*),
            MysqlCommand::InitDb(d) => d.$method($($arg),*),
            MysqlCommand::Ping(d) => d.$method($($arg),*),
            MysqlCommand::StmtClose(d) => d.$method($($arg),*),
            MysqlCommand::Response(d) => d.$method($($arg),*),
            MysqlCommand::Ok(d) => d.$method($($arg),*),
            MysqlCommand::Err(d) => d.$method($($arg),*),
            MysqlCommand::Eof(d) => d.$method($($arg),*),
        }
    };
}

impl CommandDissector for MysqlCommand {
    #[inline]
    fn name(&self) -> &'static str {
        delegate_dissector!(self, name)
    }

    #[inline]
    fn display_name(&self) -> &'static str {
        delegate_dissector!(self, display_name)
    }

    #[inline]
    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        delegate_dissector!(self, fastfail, msg)
    }

    #[inline]
    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        delegate_dissector!(self, parse, msg)
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for MysqlCommand {
                fn from(d: $ty) -> Self {
                    MysqlCommand::$variant(d)
                }
            }
        )*
    };
}

impl_from!(
    Request(MysqlRequest),
    Prepare(MysqlPrepare),
    Query(MysqlQuery),
    Quit(MysqlQuit),
    InitDb(MysqlInitDb),
    Ping(MysqlPing),
    StmtClose(MysqlStmtClose),
    Response(MysqlResponse),
    Ok(MysqlOk),
    Err(MysqlErr),
    Eof(MysqlEof),
);
