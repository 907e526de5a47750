//! FTP command-line builders (spec §4.1 "Command channel", C2)
//!
//! Pure string construction only — no reply parsing lives here. Reply
//! framing is owned entirely by [`crate::client::io`], which is the only
//! place that needs to know about the `NNN-`/`NNN ` continuation grammar;
//! keeping that logic in one place avoids the two-parsers-for-one-grammar
//! trap a command/response split can fall into.

/// `USER <username>`
pub fn user(username: &str) -> String {
    format!("USER {username}")
}

/// `PASS <password>`
pub fn pass(password: &str) -> String {
    format!("PASS {password}")
}

/// `ACCT <account>`
pub fn acct(account: &str) -> String {
    format!("ACCT {account}")
}

/// `REIN`
pub fn rein() -> &'static str {
    "REIN"
}

/// `QUIT`
pub fn quit() -> &'static str {
    "QUIT"
}

/// `CWD <path>`
pub fn cwd(path: &str) -> String {
    format!("CWD {path}")
}

/// `CDUP`
pub fn cdup() -> &'static str {
    "CDUP"
}

/// `PWD`
pub fn pwd() -> &'static str {
    "PWD"
}

/// `MKD <path>`
pub fn mkd(path: &str) -> String {
    format!("MKD {path}")
}

/// `RMD <path>`
pub fn rmd(path: &str) -> String {
    format!("RMD {path}")
}

/// `DELE <path>`
pub fn dele(path: &str) -> String {
    format!("DELE {path}")
}

/// `RNFR <path>`
pub fn rnfr(path: &str) -> String {
    format!("RNFR {path}")
}

/// `RNTO <path>`
pub fn rnto(path: &str) -> String {
    format!("RNTO {path}")
}

/// `ABOR`
pub fn abor() -> &'static str {
    "ABOR"
}

/// `SIZE <path>` (RFC 3659 §4)
pub fn size(path: &str) -> String {
    format!("SIZE {path}")
}

/// `MDTM <path>` (RFC 3659 §3)
pub fn mdtm(path: &str) -> String {
    format!("MDTM {path}")
}

/// `MFMT <timestamp> <path>` (MFMT draft extension)
pub fn mfmt(timestamp: &str, path: &str) -> String {
    format!("MFMT {timestamp} {path}")
}

/// `ALLO <size>` (RFC 959 §4.1.3)
pub fn allo(size: u64) -> String {
    format!("ALLO {size}")
}

/// `SITE <argument>` (RFC 959 §4.1.3)
pub fn site(argument: &str) -> String {
    format!("SITE {argument}")
}

/// `NOOP`
pub fn noop() -> &'static str {
    "NOOP"
}

/// `SYST`
pub fn syst() -> &'static str {
    "SYST"
}

/// `FEAT` (RFC 2389 §3)
pub fn feat() -> &'static str {
    "FEAT"
}

/// `OPTS <feature> <argument>` (RFC 2389 §4)
pub fn opts(feature: &str, argument: &str) -> String {
    format!("OPTS {feature} {argument}")
}

/// `TYPE <argument>` (RFC 959 §4.1.2), `argument` already formatted by
/// [`crate::client::state::FileType::command_argument`].
pub fn type_(argument: &str) -> String {
    format!("TYPE {argument}")
}

/// `STRU F` — only file structure is implemented (spec §4.2 Non-goals).
pub fn stru_file() -> &'static str {
    "STRU F"
}

/// `MODE <S|Z>` (RFC 959 §4.1.2, RFC 8417 deflate extension)
pub fn mode(argument: &str) -> String {
    format!("MODE {argument}")
}

/// `PASV` (RFC 959 §4.1.2)
pub fn pasv() -> &'static str {
    "PASV"
}

/// `EPSV` (RFC 2428 §3)
pub fn epsv() -> &'static str {
    "EPSV"
}

/// `PORT <h1,h2,h3,h4,p1,p2>` (RFC 959 §4.1.2)
pub fn port(argument: &str) -> String {
    format!("PORT {argument}")
}

/// `EPRT <|af|addr|port|>` (RFC 2428 §2)
pub fn eprt(argument: &str) -> String {
    format!("EPRT {argument}")
}

/// `REST <offset>` (RFC 959 §4.1.3)
pub fn rest(offset: u64) -> String {
    format!("REST {offset}")
}

/// `RETR <path>`
pub fn retr(path: &str) -> String {
    format!("RETR {path}")
}

/// `STOR <path>`
pub fn stor(path: &str) -> String {
    format!("STOR {path}")
}

/// `APPE <path>`
pub fn appe(path: &str) -> String {
    format!("APPE {path}")
}

/// `STOU` (RFC 1123 §4.1.2.13)
pub fn stou() -> &'static str {
    "STOU"
}

/// `LIST [path]` (RFC 959 §4.1.1)
pub fn list(path: Option<&str>) -> String {
    match path {
        Some(path) => format!("LIST {path}"),
        None => "LIST".to_string(),
    }
}

/// `NLST [path]` (RFC 959 §4.1.1)
pub fn nlst(path: Option<&str>) -> String {
    match path {
        Some(path) => format!("NLST {path}"),
        None => "NLST".to_string(),
    }
}

/// `MLSD [path]` (RFC 3659 §7)
pub fn mlsd(path: Option<&str>) -> String {
    match path {
        Some(path) => format!("MLSD {path}"),
        None => "MLSD".to_string(),
    }
}

/// `MLST <path>` (RFC 3659 §7)
pub fn mlst(path: &str) -> String {
    format!("MLST {path}")
}

/// `AUTH <mechanism>` (RFC 2228 §3, typically `TLS` or `SSL`)
pub fn auth(mechanism: &str) -> String {
    format!("AUTH {mechanism}")
}

/// `PBSZ <size>` (RFC 2228 §3)
pub fn pbsz(size: u64) -> String {
    format!("PBSZ {size}")
}

/// `PROT <level>` (RFC 2228 §3, one of `C`/`S`/`E`/`P`)
pub fn prot(level: &str) -> String {
    format!("PROT {level}")
}

/// `CCC` (RFC 2228 §3)
pub fn ccc() -> &'static str {
    "CCC"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_login_sequence_commands() {
        assert_eq!(user("anonymous"), "USER anonymous");
        assert_eq!(pass("anonymous@"), "PASS anonymous@");
        assert_eq!(acct("acct1"), "ACCT acct1");
    }

    #[test]
    fn builds_navigation_commands() {
        assert_eq!(cwd("/pub"), "CWD /pub");
        assert_eq!(mkd("newdir"), "MKD newdir");
        assert_eq!(rnfr("old.txt"), "RNFR old.txt");
        assert_eq!(rnto("new.txt"), "RNTO new.txt");
    }

    #[test]
    fn builds_data_connection_commands() {
        assert_eq!(port("127,0,0,1,200,10"), "PORT 127,0,0,1,200,10");
        assert_eq!(eprt("|1|127.0.0.1|50000|"), "EPRT |1|127.0.0.1|50000|");
        assert_eq!(pasv(), "PASV");
        assert_eq!(epsv(), "EPSV");
    }

    #[test]
    fn builds_listing_commands_with_and_without_path() {
        assert_eq!(list(None), "LIST");
        assert_eq!(list(Some("/pub")), "LIST /pub");
        assert_eq!(mlsd(None), "MLSD");
    }

    #[test]
    fn builds_ftps_commands() {
        assert_eq!(auth("TLS"), "AUTH TLS");
        assert_eq!(pbsz(0), "PBSZ 0");
        assert_eq!(prot("P"), "PROT P");
        assert_eq!(ccc(), "CCC");
    }
}
