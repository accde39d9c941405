//! Client request dissectors.

use std::borrow::Cow;
use std::sync::Arc;

use super::{command, command_of, COMMAND_OFFSET, MIN_FRAME_LEN};
use crate::dissect::{CommandDissector, Verdict};
use crate::message::{names, PayloadMessage};
use crate::sql::{is_sql, SqlNormalizer};

/// Start of the command arguments (statement text, schema name).
const ARGS_OFFSET: usize = COMMAND_OFFSET + 1;

/// Query-attribute prefix sent by 8.0.26+ clients: zero parameters, one
/// parameter set.
const EMPTY_QUERY_ATTRIBUTES: [u8; 2] = [0x00, 0x01];

#[inline]
fn too_short(msg: &PayloadMessage<'_>) -> bool {
    msg.len() < MIN_FRAME_LEN
}

/// Fastfail shared by all single-command dissectors.
#[inline]
fn not_command(msg: &PayloadMessage<'_>, expected: u8) -> bool {
    command_of(msg) != Some(expected)
}

/// Validate statement text and record `sql` and `content_key`.
fn record_statement(
    msg: &mut PayloadMessage<'_>,
    normalizer: &SqlNormalizer,
    sql: &[u8],
) -> Verdict {
    let sql: Cow<'_, str> = String::from_utf8_lossy(sql);
    if !is_sql(&sql) {
        return Verdict::Rejected;
    }
    let content_key = normalizer.normalize(&sql);
    msg.add_string_attribute(names::SQL, &*sql);
    msg.add_string_attribute(names::CONTENT_KEY, &*content_key);
    Verdict::Detailed
}

/// Any frame long enough to carry a command byte.
///
/// Registered as the fallback of the request pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlRequest;

impl CommandDissector for MysqlRequest {
    fn name(&self) -> &'static str {
        "mysql_request"
    }

    fn display_name(&self) -> &'static str {
        "MySQL request"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        too_short(msg)
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        if too_short(msg) {
            return Verdict::Unmatched;
        }
        Verdict::Coarse
    }
}

/// `COM_STMT_PREPARE`: the statement text follows the command byte.
#[derive(Debug, Clone)]
pub struct MysqlPrepare {
    normalizer: Arc<SqlNormalizer>,
}

impl MysqlPrepare {
    pub fn new(normalizer: Arc<SqlNormalizer>) -> Self {
        Self { normalizer }
    }
}

impl CommandDissector for MysqlPrepare {
    fn name(&self) -> &'static str {
        "mysql_prepare"
    }

    fn display_name(&self) -> &'static str {
        "COM_STMT_PREPARE"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        not_command(msg, command::COM_STMT_PREPARE)
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        let Some(sql) = msg.tail(ARGS_OFFSET) else {
            return Verdict::Unmatched;
        };
        record_statement(msg, &self.normalizer, sql)
    }
}

/// `COM_QUERY`.
///
/// With `CLIENT_QUERY_ATTRIBUTES` the text is preceded by a parameter count
/// and a parameter-set count. Only the empty form (`0x00 0x01`) is skipped;
/// a frame carrying query attributes is validated as-is and normally
/// rejected.
#[derive(Debug, Clone)]
pub struct MysqlQuery {
    normalizer: Arc<SqlNormalizer>,
}

impl MysqlQuery {
    pub fn new(normalizer: Arc<SqlNormalizer>) -> Self {
        Self { normalizer }
    }
}

impl CommandDissector for MysqlQuery {
    fn name(&self) -> &'static str {
        "mysql_query"
    }

    fn display_name(&self) -> &'static str {
        "COM_QUERY"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        not_command(msg, command::COM_QUERY)
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        let Some(mut sql) = msg.tail(ARGS_OFFSET) else {
            return Verdict::Unmatched;
        };
        if sql.len() > EMPTY_QUERY_ATTRIBUTES.len() && sql.starts_with(&EMPTY_QUERY_ATTRIBUTES) {
            sql = &sql[EMPTY_QUERY_ATTRIBUTES.len()..];
        }
        record_statement(msg, &self.normalizer, sql)
    }
}

/// `COM_QUIT`: the server closes the connection without replying.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlQuit;

impl CommandDissector for MysqlQuit {
    fn name(&self) -> &'static str {
        "mysql_quit"
    }

    fn display_name(&self) -> &'static str {
        "COM_QUIT"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        not_command(msg, command::COM_QUIT)
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        if too_short(msg) {
            return Verdict::Unmatched;
        }
        msg.add_bool_attribute(names::ONEWAY, true);
        Verdict::Detailed
    }
}

/// `COM_INIT_DB`: switch the default schema, equivalent to `USE <db>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlInitDb;

impl CommandDissector for MysqlInitDb {
    fn name(&self) -> &'static str {
        "mysql_init_db"
    }

    fn display_name(&self) -> &'static str {
        "COM_INIT_DB"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        not_command(msg, command::COM_INIT_DB)
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        let Some(schema) = msg.tail(ARGS_OFFSET) else {
            return Verdict::Unmatched;
        };
        if schema.is_empty() {
            return Verdict::Rejected;
        }
        let statement = format!("USE {}", String::from_utf8_lossy(schema));
        msg.add_string_attribute(names::SQL, statement.as_str());
        msg.add_string_attribute(names::CONTENT_KEY, statement);
        Verdict::Detailed
    }
}

/// `COM_PING`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlPing;

impl CommandDissector for MysqlPing {
    fn name(&self) -> &'static str {
        "mysql_ping"
    }

    fn display_name(&self) -> &'static str {
        "COM_PING"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        not_command(msg, command::COM_PING)
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        if too_short(msg) {
            return Verdict::Unmatched;
        }
        Verdict::Detailed
    }
}

/// `COM_STMT_CLOSE`: deallocates a prepared statement, no reply is sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlStmtClose;

impl CommandDissector for MysqlStmtClose {
    fn name(&self) -> &'static str {
        "mysql_stmt_close"
    }

    fn display_name(&self) -> &'static str {
        "COM_STMT_CLOSE"
    }

    fn fastfail(&self, msg: &PayloadMessage<'_>) -> bool {
        not_command(msg, command::COM_STMT_CLOSE)
    }

    fn parse(&self, msg: &mut PayloadMessage<'_>) -> Verdict {
        if too_short(msg) {
            return Verdict::Unmatched;
        }
        msg.add_bool_attribute(names::ONEWAY, true);
        Verdict::Detailed
    }
}
