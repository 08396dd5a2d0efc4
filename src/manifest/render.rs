use super::ResolvedManifest;

/// Render a manifest as PKGBUILD text.
///
/// Output depends only on the manifest value; rendering the same manifest
/// twice gives byte-identical text.
pub fn render(manifest: &ResolvedManifest) -> String {
    let deps = &manifest.dependencies;
    let optdepends = deps
        .optdepends
        .iter()
        .map(|opt| {
            if opt.reason.is_empty() {
                opt.package.clone()
            } else {
                format!("{}: {}", opt.package, opt.reason)
            }
        })
        .collect::<Vec<_>>();

    let mut lines = vec![
        format!("# Maintainer: {}", manifest.maintainer),
        String::new(),
        format!("pkgbase={}", manifest.pkgbase),
        format!("pkgname={}", bash_array(&manifest.pkgnames)),
        format!("pkgver={}", manifest.pkgver.declared()),
        format!("pkgrel={}", manifest.pkgrel),
        format!("url={}", bash_quote(&manifest.url)),
        format!("pkgdesc={}", bash_quote(&manifest.description)),
        format!("arch={}", bash_array(&manifest.arch)),
        format!("license={}", bash_array(&manifest.license)),
        format!("groups={}", bash_array(&manifest.groups)),
        format!("source={}", bash_array(&[manifest.source.to_source_entry()])),
        "sha256sums=('SKIP')".to_string(),
        format!("depends={}", bash_array(&deps.depends)),
        format!("makedepends={}", bash_array(&deps.makedepends)),
        format!("optdepends={}", bash_array(&optdepends)),
        format!("provides={}", bash_array(&deps.provides)),
        format!("conflicts={}", bash_array(&deps.conflicts)),
        format!("replaces={}", bash_array(&deps.replaces)),
    ];

    if let Some(function) = manifest.pkgver.shell_function() {
        lines.push(String::new());
        lines.push(function);
    }

    lines.push(String::new());
    lines.push(shell_function("build", &manifest.build_steps));
    lines.push(String::new());
    lines.push(shell_function("package", &manifest.package_steps));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn shell_function(name: &str, steps: &[String]) -> String {
    let body = steps
        .iter()
        .map(|step| format!("    {step};\n"))
        .collect::<String>();
    format!("{name}() {{\n{body}}}")
}

fn bash_array<S: AsRef<str>>(items: &[S]) -> String {
    let quoted = items
        .iter()
        .map(|item| bash_quote(item.as_ref()))
        .collect::<Vec<_>>()
        .join(" ");
    format!("({quoted})")
}

/// Double-quote `value` for bash, escaping the characters that stay special.
pub fn bash_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::GitSource;
    use crate::metadata::OptDepend;
    use crate::plan::PkgVer;
    use crate::resolve::ResolvedDependencies;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn manifest(pkgver: PkgVer) -> ResolvedManifest {
        ResolvedManifest {
            project: "kwallet".to_string(),
            maintainer: "KDE Community <http://www.kde.org>".to_string(),
            pkgbase: "kde-banana-kwallet-git".to_string(),
            pkgnames: strings(&["kde-banana-kwallet-git"]),
            pkgver,
            pkgrel: 1,
            url: "https://community.kde.org/KDE_Linux".to_string(),
            description: "Build of kwallet for KDE Linux".to_string(),
            arch: strings(&["x86_64"]),
            license: strings(&["GPL-2.0-only"]),
            groups: strings(&["kde-linux", "banana"]),
            source: GitSource {
                name: "kwallet".to_string(),
                locator: "https://invent.kde.org/frameworks/kwallet".to_string(),
            },
            dependencies: ResolvedDependencies {
                depends: strings(&["gpgme", "kde-banana-kconfig-git"]),
                makedepends: strings(&["extra-cmake-modules"]),
                optdepends: vec![OptDepend {
                    package: "kwalletmanager".to_string(),
                    reason: "Configuration GUI".to_string(),
                }],
                provides: strings(&["kwallet", "org.freedesktop.secrets"]),
                conflicts: strings(&["kwallet"]),
                replaces: strings(&["kwallet"]),
            },
            build_steps: strings(&[
                "cmake -B build -S \"kwallet\" \\\n\t\t-G Ninja",
                "cmake --build build --parallel 5",
            ]),
            package_steps: strings(&["DESTDIR=\"$pkgdir\" cmake --install build"]),
        }
    }

    /// Reads back the quoted tokens of `name=(...)`.
    fn parse_array(text: &str, name: &str) -> Vec<String> {
        let prefix = format!("{name}=(");
        let line = text
            .lines()
            .find(|line| line.starts_with(&prefix))
            .unwrap_or_else(|| panic!("no {name} array"));
        let body = line[prefix.len()..].strip_suffix(')').unwrap();

        let mut tokens = Vec::new();
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            if c != '"' {
                continue;
            }
            let mut token = String::new();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => token.push(chars.next().unwrap()),
                    '"' => break,
                    other => token.push(other),
                }
            }
            tokens.push(token);
        }
        tokens
    }

    fn as_set(items: &[String]) -> BTreeSet<String> {
        items.iter().cloned().collect()
    }

    #[test]
    fn test_renders_literal_version_manifest() {
        let text = render(&manifest(PkgVer::Literal("abc123".to_string())));
        let expected = r#"# Maintainer: KDE Community <http://www.kde.org>

pkgbase=kde-banana-kwallet-git
pkgname=("kde-banana-kwallet-git")
pkgver=abc123
pkgrel=1
url="https://community.kde.org/KDE_Linux"
pkgdesc="Build of kwallet for KDE Linux"
arch=("x86_64")
license=("GPL-2.0-only")
groups=("kde-linux" "banana")
source=("kwallet::git+https://invent.kde.org/frameworks/kwallet")
sha256sums=('SKIP')
depends=("gpgme" "kde-banana-kconfig-git")
makedepends=("extra-cmake-modules")
optdepends=("kwalletmanager: Configuration GUI")
provides=("kwallet" "org.freedesktop.secrets")
conflicts=("kwallet")
replaces=("kwallet")

build() {
    cmake -B build -S "kwallet" \
		-G Ninja;
    cmake --build build --parallel 5;
}

package() {
    DESTDIR="$pkgdir" cmake --install build;
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_renders_pkgver_function_when_unpinned() {
        let text = render(&manifest(PkgVer::FromSource {
            source_dir: "kwallet".to_string(),
        }));
        assert!(text.contains("\npkgver=0\n"));
        assert!(text.contains("\npkgver() {\n    cd \"$srcdir/kwallet\"\n"));
        let pkgver_at = text.find("pkgver() {").unwrap();
        let build_at = text.find("build() {").unwrap();
        assert!(pkgver_at < build_at);
    }

    #[test]
    fn test_dependency_arrays_round_trip() {
        let manifest = manifest(PkgVer::Literal("1".to_string()));
        let text = render(&manifest);
        let deps = &manifest.dependencies;

        assert_eq!(as_set(&parse_array(&text, "depends")), as_set(&deps.depends));
        assert_eq!(
            as_set(&parse_array(&text, "makedepends")),
            as_set(&deps.makedepends)
        );
        assert_eq!(as_set(&parse_array(&text, "provides")), as_set(&deps.provides));
        assert_eq!(as_set(&parse_array(&text, "conflicts")), as_set(&deps.conflicts));
        assert_eq!(as_set(&parse_array(&text, "replaces")), as_set(&deps.replaces));
    }

    #[test]
    fn test_empty_arrays_render_as_empty_parens() {
        let mut manifest = manifest(PkgVer::Literal("1".to_string()));
        manifest.dependencies = ResolvedDependencies::default();
        let text = render(&manifest);
        assert!(text.contains("\ndepends=()\n"));
        assert!(text.contains("\noptdepends=()\n"));
        assert!(parse_array(&text, "depends").is_empty());
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let manifest = manifest(PkgVer::FromSource {
            source_dir: "kwallet".to_string(),
        });
        assert_eq!(render(&manifest), render(&manifest));
    }

    #[test]
    fn test_quote_escapes_shell_specials() {
        assert_eq!(bash_quote("plain"), "\"plain\"");
        assert_eq!(bash_quote("a \"b\" $c `d` \\e"), "\"a \\\"b\\\" \\$c \\`d\\` \\\\e\"");
    }

    #[test]
    fn test_optdepends_without_reason_is_bare_package() {
        let mut manifest = manifest(PkgVer::Literal("1".to_string()));
        manifest.dependencies.optdepends = vec![OptDepend {
            package: "kio-extras".to_string(),
            reason: String::new(),
        }];
        assert!(render(&manifest).contains("\noptdepends=(\"kio-extras\")\n"));
    }
}
