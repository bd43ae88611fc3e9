//! Standard library allowlists.
//!
//! Static per-language lists of module names that never need a manifest
//! entry. Lookups go through lazily built hash sets shared for the life of
//! the process.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Python 3 standard library top-level modules.
const PYTHON_STDLIB: &[&str] = &[
    "__future__", "abc", "aifc", "argparse", "array", "ast", "asynchat", "asyncio", "asyncore",
    "atexit", "audioop", "base64", "bdb", "binascii", "bisect", "builtins", "bz2", "calendar",
    "cgi", "cgitb", "chunk", "cmath", "cmd", "code", "codecs", "codeop", "collections",
    "colorsys", "compileall", "concurrent", "configparser", "contextlib", "contextvars", "copy",
    "copyreg", "cProfile", "crypt", "csv", "ctypes", "curses", "dataclasses", "datetime", "dbm",
    "decimal", "difflib", "dis", "doctest", "email", "encodings", "ensurepip", "enum", "errno",
    "faulthandler", "fcntl", "filecmp", "fileinput", "fnmatch", "fractions", "ftplib",
    "functools", "gc", "getopt", "getpass", "gettext", "glob", "graphlib", "grp", "gzip",
    "hashlib", "heapq", "hmac", "html", "http", "imaplib", "imghdr", "importlib", "inspect",
    "io", "ipaddress", "itertools", "json", "keyword", "lib2to3", "linecache", "locale",
    "logging", "lzma", "mailbox", "marshal", "math", "mimetypes", "mmap", "modulefinder",
    "msvcrt", "multiprocessing", "netrc", "numbers", "operator", "optparse", "os", "pathlib",
    "pdb", "pickle", "pickletools", "pkgutil", "platform", "plistlib", "poplib", "posix",
    "pprint", "profile", "pstats", "pty", "pwd", "py_compile", "pyclbr", "pydoc", "queue",
    "quopri", "random", "re", "readline", "reprlib", "resource", "rlcompleter", "runpy",
    "sched", "secrets", "select", "selectors", "shelve", "shlex", "shutil", "signal", "site",
    "smtplib", "socket", "socketserver", "sqlite3", "ssl", "stat", "statistics", "string",
    "stringprep", "struct", "subprocess", "symtable", "sys", "sysconfig", "syslog", "tabnanny",
    "tarfile", "tempfile", "termios", "textwrap", "threading", "time", "timeit", "tkinter",
    "token", "tokenize", "tomllib", "trace", "traceback", "tracemalloc", "tty", "turtle",
    "types", "typing", "unicodedata", "unittest", "urllib", "uuid", "venv", "warnings", "wave",
    "weakref", "webbrowser", "winreg", "wsgiref", "xml", "xmlrpc", "zipapp", "zipfile",
    "zipimport", "zlib", "zoneinfo",
];

/// Node.js builtin modules (also accepted with a `node:` prefix).
const NODE_BUILTINS: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "test", "timers",
    "tls", "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

/// Rust crates and path roots that never appear in Cargo.toml.
const RUST_BUILTINS: &[&str] = &[
    "std", "core", "alloc", "proc_macro", "test", "crate", "self", "super", "Self",
];

static PYTHON_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| PYTHON_STDLIB.iter().copied().collect());
static NODE_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| NODE_BUILTINS.iter().copied().collect());
static RUST_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| RUST_BUILTINS.iter().copied().collect());

/// Check a Python top-level module name.
pub fn is_python_stdlib(module: &str) -> bool {
    PYTHON_SET.contains(module)
}

/// Check a normalized npm specifier (`fs`, `node:fs`, `fs/promises`).
pub fn is_node_builtin(module: &str) -> bool {
    let name = module.strip_prefix("node:").unwrap_or(module);
    let root = name.split('/').next().unwrap_or(name);
    NODE_SET.contains(root) || module.starts_with("node:")
}

/// Go standard library packages have no dot in their first path element.
pub fn is_go_stdlib(import_path: &str) -> bool {
    let first = import_path.split('/').next().unwrap_or(import_path);
    !first.is_empty() && !first.contains('.')
}

pub fn is_rust_builtin(name: &str) -> bool {
    RUST_SET.contains(name)
}
