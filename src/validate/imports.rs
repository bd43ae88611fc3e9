//! Import extraction from generated source files.
//!
//! Extracts the external packages a file imports using per-language regex
//! patterns. Relative and path-alias imports are dropped here; standard
//! library and bundle-local modules are filtered by the dependency layer.
//! Supports Python, JavaScript/TypeScript, Go, and Rust.

use regex::Regex;
use std::collections::HashSet;

use crate::bundle::line_of_offset;
use crate::languages::Language;

use super::fallback::{FallbackStyle, LiteralScanner};
use super::manifest::Ecosystem;

/// Information about an imported dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportedDependency {
    /// The package/module name (full import path for Go)
    pub name: String,
    /// Which ecosystem this dependency belongs to
    pub ecosystem: Ecosystem,
    /// Source file where the import was found
    pub file: String,
    /// Line number where the import was found
    pub line: usize,
}

/// Collects imports for one file, keeping the first line each name appears on.
struct Collector<'a> {
    ecosystem: Ecosystem,
    file: &'a str,
    seen: HashSet<String>,
    imports: Vec<ImportedDependency>,
}

impl<'a> Collector<'a> {
    fn new(ecosystem: Ecosystem, file: &'a str) -> Self {
        Self {
            ecosystem,
            file,
            seen: HashSet::new(),
            imports: Vec::new(),
        }
    }

    fn push(&mut self, name: String, line: usize) {
        if self.seen.insert(name.clone()) {
            self.imports.push(ImportedDependency {
                name,
                ecosystem: self.ecosystem,
                file: self.file.to_string(),
                line,
            });
        }
    }

    fn finish(mut self) -> Vec<ImportedDependency> {
        self.imports.sort_by_key(|i| i.line);
        self.imports
    }
}

/// Extract imports from Python source code.
pub fn extract_python_imports(content: &str, file: &str) -> Vec<ImportedDependency> {
    lazy_static::lazy_static! {
        // import foo, bar.baz as qux
        static ref IMPORT_RE: Regex = Regex::new(r"^\s*import\s+([a-zA-Z_][\w.]*(?:\s+as\s+\w+)?(?:\s*,\s*[a-zA-Z_][\w.]*(?:\s+as\s+\w+)?)*)").unwrap();
        // from foo.bar import baz (relative `from .x` never matches)
        static ref FROM_IMPORT_RE: Regex = Regex::new(r"^\s*from\s+([a-zA-Z_][a-zA-Z0-9_]*)[\w.]*\s+import\b").unwrap();
    }

    let mut collector = Collector::new(Ecosystem::PyPI, file);
    let style = FallbackStyle::for_language(Language::Python);
    let mut scanner = LiteralScanner::new();

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        // Lines that start inside a triple-quoted string are text, not code
        let in_string = scanner.in_literal();
        scanner.scan_line(line, &style, |_| {});
        if in_string {
            continue;
        }

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(caps) = IMPORT_RE.captures(line) {
            for item in caps[1].split(',') {
                let module = item.split_whitespace().next().unwrap_or("");
                let top = module.split('.').next().unwrap_or("");
                if is_external_python_module(top) {
                    collector.push(top.to_string(), line_num + 1);
                }
            }
        }

        if let Some(caps) = FROM_IMPORT_RE.captures(line) {
            let top = &caps[1];
            if is_external_python_module(top) {
                collector.push(top.to_string(), line_num + 1);
            }
        }
    }

    collector.finish()
}

/// Private modules (leading underscore) are never distribution names.
fn is_external_python_module(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('_')
}

/// Extract imports from JavaScript/TypeScript source code.
pub fn extract_js_imports(content: &str, file: &str) -> Vec<ImportedDependency> {
    lazy_static::lazy_static! {
        // import x from 'pkg', export { y } from 'pkg', import type T from 'pkg'
        static ref FROM_RE: Regex = Regex::new(r#"(?:^|[\s;}])(?:import|export)\b[^;'"]*?\bfrom\s*['"]([^'"\n]+)['"]"#).unwrap();
        // import 'pkg' (side effects only)
        static ref BARE_IMPORT_RE: Regex = Regex::new(r#"(?m)^\s*import\s*['"]([^'"\n]+)['"]"#).unwrap();
        // import('pkg')
        static ref DYNAMIC_IMPORT_RE: Regex = Regex::new(r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).unwrap();
        // require('pkg')
        static ref REQUIRE_RE: Regex = Regex::new(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).unwrap();
    }

    let code = blank_c_style_comments(content);
    let mut collector = Collector::new(Ecosystem::Npm, file);

    for re in [&*FROM_RE, &*BARE_IMPORT_RE, &*DYNAMIC_IMPORT_RE, &*REQUIRE_RE] {
        for caps in re.captures_iter(&code) {
            let Some(m) = caps.get(1) else { continue };
            let spec = m.as_str().trim();
            if is_local_js_specifier(spec) {
                continue;
            }
            collector.push(extract_npm_package_name(spec), line_of_offset(&code, m.start()));
        }
    }

    collector.finish()
}

/// Relative paths, absolute paths, URLs, and common bundler path aliases.
fn is_local_js_specifier(spec: &str) -> bool {
    spec.is_empty()
        || spec.starts_with('.')
        || spec.starts_with('/')
        || spec.starts_with("@/")
        || spec.starts_with("~/")
        || spec.starts_with('~')
        || spec.starts_with('#')
        || spec.starts_with("http://")
        || spec.starts_with("https://")
        || spec.starts_with("data:")
        || spec.starts_with("virtual:")
}

/// Extract the package name from an npm import path.
/// For scoped packages (@org/pkg/...), returns @org/pkg.
/// For regular packages (pkg/...), returns pkg.
pub fn extract_npm_package_name(import_path: &str) -> String {
    if import_path.starts_with('@') {
        // Scoped package: @org/pkg/subpath -> @org/pkg
        let parts: Vec<&str> = import_path.splitn(3, '/').collect();
        if parts.len() >= 2 {
            format!("{}/{}", parts[0], parts[1])
        } else {
            import_path.to_string()
        }
    } else if let Some(builtin) = import_path.strip_prefix("node:") {
        format!("node:{}", builtin.split('/').next().unwrap_or(builtin))
    } else {
        import_path
            .split('/')
            .next()
            .unwrap_or(import_path)
            .to_string()
    }
}

/// Extract imports from Go source code. Names are full import paths.
pub fn extract_go_imports(content: &str, file: &str) -> Vec<ImportedDependency> {
    lazy_static::lazy_static! {
        // Single import: import "package" or import alias "package"
        static ref SINGLE_IMPORT_RE: Regex = Regex::new(r#"(?m)^\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#).unwrap();
        // Import block: import ( "pkg1" "pkg2" )
        static ref IMPORT_BLOCK_RE: Regex = Regex::new(r#"(?s)\bimport\s*\((.*?)\)"#).unwrap();
        // Individual import within block
        static ref BLOCK_ITEM_RE: Regex = Regex::new(r#"(?m)^\s*(?:[\w.]+\s+)?"([^"]+)""#).unwrap();
    }

    let code = blank_c_style_comments(content);
    let mut collector = Collector::new(Ecosystem::Go, file);

    for caps in SINGLE_IMPORT_RE.captures_iter(&code) {
        if let Some(m) = caps.get(1) {
            collector.push(m.as_str().to_string(), line_of_offset(&code, m.start()));
        }
    }

    for block_caps in IMPORT_BLOCK_RE.captures_iter(&code) {
        let Some(block) = block_caps.get(1) else { continue };
        for caps in BLOCK_ITEM_RE.captures_iter(block.as_str()) {
            if let Some(m) = caps.get(1) {
                let offset = block.start() + m.start();
                collector.push(m.as_str().to_string(), line_of_offset(&code, offset));
            }
        }
    }

    collector.finish()
}

/// Extract the module name from a Go import path.
/// github.com/user/repo/pkg -> github.com/user/repo
pub fn extract_go_module_name(import_path: &str) -> String {
    let parts: Vec<&str> = import_path.split('/').collect();

    // Most Go modules are at least 3 parts: domain/user/repo
    if parts.len() >= 3 {
        format!("{}/{}/{}", parts[0], parts[1], parts[2])
    } else {
        import_path.to_string()
    }
}

/// Extract imports from Rust source code.
pub fn extract_rust_imports(content: &str, file: &str) -> Vec<ImportedDependency> {
    lazy_static::lazy_static! {
        // use crate_name::... / pub use crate_name::...
        static ref USE_RE: Regex = Regex::new(r"^(?:pub(?:\([\w:]+\))?\s+)?use\s+(?:::)?([a-zA-Z_][a-zA-Z0-9_]*)(?:::|;|\s+as\b)").unwrap();
        // extern crate crate_name
        static ref EXTERN_CRATE_RE: Regex = Regex::new(r"^extern\s+crate\s+([a-zA-Z_][a-zA-Z0-9_]*)").unwrap();
        // #[tokio::main], #[async_trait::async_trait]
        static ref ATTR_PATH_RE: Regex = Regex::new(r"^#!?\[([a-z_][a-z0-9_]*)::").unwrap();
    }

    let mut collector = Collector::new(Ecosystem::Crates, file);

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
            continue;
        }

        for re in [&*USE_RE, &*EXTERN_CRATE_RE, &*ATTR_PATH_RE] {
            if let Some(caps) = re.captures(trimmed) {
                collector.push(caps[1].to_string(), line_num + 1);
            }
        }
    }

    collector.finish()
}

/// Replace `/* */` and `//` comments with spaces, keeping byte offsets and
/// newlines intact. String literals are respected so `"http://x"` survives.
pub(crate) fn blank_c_style_comments(content: &str) -> String {
    let bytes = content.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    let mut quote: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q || (b == b'\n' && q != b'`') {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' | b'\'' | b'`' => {
                quote = Some(b);
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out[i] = b' ';
                out[i + 1] = b' ';
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    if bytes[i] != b'\n' {
                        out[i] = b' ';
                    }
                    i += 1;
                }
                if i < bytes.len() {
                    out[i] = b' ';
                    if i + 1 < bytes.len() {
                        out[i + 1] = b' ';
                    }
                    i += 2;
                }
            }
            _ => i += 1,
        }
    }

    // Multi-byte characters inside comments become several spaces; the
    // lossy path only triggers on input that was not UTF-8 to begin with.
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(imports: &[ImportedDependency]) -> Vec<&str> {
        imports.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_extract_python_imports() {
        let content = r#"
"""Module docstring.
import notreal
"""
import requests
import os, numpy as np
from flask import Flask
from . import sibling
from .models import User
import yaml.loader
"#;
        let imports = extract_python_imports(content, "app.py");
        let names = names(&imports);

        assert!(names.contains(&"requests"));
        assert!(names.contains(&"os"));
        assert!(names.contains(&"numpy"));
        assert!(names.contains(&"flask"));
        assert!(names.contains(&"yaml"));
        assert!(!names.contains(&"notreal"));
        assert!(!names.contains(&"sibling"));
        assert!(!names.contains(&"models"));
    }

    #[test]
    fn test_python_strings_opened_mid_line() {
        let content = "USAGE = \"\"\"\nExample:\nimport mylib\nfrom otherlib import thing\n\"\"\"\nHELP = f'''x\n  import alsonot\n''' + \"\"\n\nimport requests\n";
        let imports = extract_python_imports(content, "app.py");
        assert_eq!(names(&imports), vec!["requests"]);
        assert_eq!(imports[0].line, 10);
    }

    #[test]
    fn test_python_import_lines() {
        let imports = extract_python_imports("\n\nimport requests\n", "a.py");
        assert_eq!(imports[0].line, 3);
        assert_eq!(imports[0].ecosystem, Ecosystem::PyPI);
    }

    #[test]
    fn test_extract_js_imports() {
        let content = r#"
import express from 'express';
import { useState } from 'react';
import type { Foo } from "@acme/types/foo";
import {
  a,
  b,
} from 'lodash/fp';
import './styles.css';
import '@/components/Button';
import 'dotenv/config';
const fs = require('node:fs');
const chalk = require("chalk");
// import fake from 'commented-out';
/* const x = require('also-commented'); */
const lazy = await import('dayjs');
export { default as zod } from 'zod';
"#;
        let imports = extract_js_imports(content, "index.ts");
        let names = names(&imports);

        for expected in [
            "express", "react", "@acme/types", "lodash", "dotenv", "node:fs", "chalk", "dayjs",
            "zod",
        ] {
            assert!(names.contains(&expected), "missing {} in {:?}", expected, names);
        }
        assert!(!names.contains(&"commented-out"));
        assert!(!names.contains(&"also-commented"));
        assert!(!names.iter().any(|n| n.starts_with('.') || n.starts_with("@/")));
    }

    #[test]
    fn test_js_import_line_numbers() {
        let content = "const a = 1;\n\nimport x from 'express';\n";
        let imports = extract_js_imports(content, "a.js");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].line, 3);
    }

    #[test]
    fn test_extract_npm_package_name() {
        assert_eq!(extract_npm_package_name("lodash"), "lodash");
        assert_eq!(extract_npm_package_name("lodash/get"), "lodash");
        assert_eq!(extract_npm_package_name("@types/node"), "@types/node");
        assert_eq!(extract_npm_package_name("@babel/core/lib"), "@babel/core");
        assert_eq!(extract_npm_package_name("node:fs/promises"), "node:fs");
    }

    #[test]
    fn test_extract_go_imports() {
        let content = r#"
package main

import (
    "fmt"
    gin "github.com/gin-gonic/gin"
    "github.com/spf13/cobra/doc"
)

import "golang.org/x/net/context"
"#;
        let imports = extract_go_imports(content, "main.go");
        let names = names(&imports);

        assert!(names.contains(&"fmt"));
        assert!(names.contains(&"github.com/gin-gonic/gin"));
        assert!(names.contains(&"github.com/spf13/cobra/doc"));
        assert!(names.contains(&"golang.org/x/net/context"));

        let gin = imports
            .iter()
            .find(|i| i.name == "github.com/gin-gonic/gin")
            .unwrap();
        assert_eq!(gin.line, 6);
    }

    #[test]
    fn test_extract_go_module_name() {
        assert_eq!(
            extract_go_module_name("github.com/spf13/cobra/doc"),
            "github.com/spf13/cobra"
        );
        assert_eq!(extract_go_module_name("gopkg.in/yaml.v3"), "gopkg.in/yaml.v3");
    }

    #[test]
    fn test_extract_rust_imports() {
        let content = r#"
use std::collections::HashMap;
use serde::{Serialize, Deserialize};
pub use anyhow::Result;
use crate::config::Config;
extern crate regex;

#[tokio::main]
async fn main() {
    // use fake::Thing;
}
"#;
        let imports = extract_rust_imports(content, "main.rs");
        let names = names(&imports);

        assert!(names.contains(&"std"));
        assert!(names.contains(&"serde"));
        assert!(names.contains(&"anyhow"));
        assert!(names.contains(&"crate"));
        assert!(names.contains(&"regex"));
        assert!(names.contains(&"tokio"));
        assert!(!names.contains(&"fake"));
    }

    #[test]
    fn test_blank_comments_keeps_offsets() {
        let content = "a // x\n/* y\nz */ b \"//keep\"";
        let blanked = blank_c_style_comments(content);
        assert_eq!(blanked.len(), content.len());
        assert_eq!(blanked.matches('\n').count(), 2);
        assert!(blanked.contains("\"//keep\""));
        assert!(!blanked.contains('x'));
        assert!(!blanked.contains('y'));
    }
}
