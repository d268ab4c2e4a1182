use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

lazy_static! {
    /// Filename / extension to fenced-code language hint. Keys are either
    /// exact names (some case-sensitive, like `Makefile`) or dotted
    /// lowercase extensions.
    static ref LANGUAGE_MAP: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        // python
        m.insert(".py", "python");
        m.insert(".pyi", "python");
        m.insert(".pyx", "python");
        m.insert(".ipynb", "json");
        m.insert("pyproject.toml", "toml");
        m.insert("setup.py", "python");
        m.insert("requirements.txt", "text");
        m.insert("requirements-dev.txt", "text");
        m.insert("pipfile", "toml");
        m.insert("pipfile.lock", "json");
        m.insert("poetry.lock", "toml");
        m.insert("setup.cfg", "ini");
        m.insert("tox.ini", "ini");
        m.insert("pytest.ini", "ini");
        // javascript / typescript
        m.insert(".js", "javascript");
        m.insert(".mjs", "javascript");
        m.insert(".cjs", "javascript");
        m.insert(".jsx", "jsx");
        m.insert(".ts", "typescript");
        m.insert(".tsx", "tsx");
        m.insert("package.json", "json");
        m.insert("package-lock.json", "json");
        m.insert("tsconfig.json", "json");
        m.insert("jsconfig.json", "json");
        m.insert(".eslintrc", "json");
        m.insert(".eslintrc.json", "json");
        m.insert(".eslintrc.js", "javascript");
        m.insert(".prettierrc", "json");
        m.insert(".babelrc", "json");
        m.insert("babel.config.js", "javascript");
        m.insert("webpack.config.js", "javascript");
        m.insert("vite.config.js", "javascript");
        m.insert("vite.config.ts", "typescript");
        m.insert("next.config.js", "javascript");
        m.insert("nuxt.config.js", "javascript");
        m.insert("vue.config.js", "javascript");
        // web
        m.insert(".html", "html");
        m.insert(".htm", "html");
        m.insert(".css", "css");
        m.insert(".scss", "scss");
        m.insert(".sass", "sass");
        m.insert(".less", "less");
        m.insert(".vue", "vue");
        m.insert(".svelte", "svelte");
        // jvm
        m.insert(".java", "java");
        m.insert(".kt", "kotlin");
        m.insert(".kts", "kotlin");
        m.insert(".groovy", "groovy");
        m.insert(".gradle", "groovy");
        m.insert(".scala", "scala");
        m.insert("pom.xml", "xml");
        m.insert("build.gradle", "groovy");
        m.insert("build.gradle.kts", "kotlin");
        m.insert("settings.gradle", "groovy");
        m.insert("gradlew", "bash");
        m.insert("application.properties", "properties");
        m.insert("application.yml", "yaml");
        m.insert("application.yaml", "yaml");
        // c family
        m.insert(".c", "c");
        m.insert(".h", "c");
        m.insert(".cpp", "cpp");
        m.insert(".hpp", "cpp");
        m.insert(".cc", "cpp");
        m.insert(".cxx", "cpp");
        m.insert(".hxx", "cpp");
        m.insert(".cs", "csharp");
        m.insert(".m", "objective-c");
        m.insert(".mm", "objective-c");
        m.insert("CMakeLists.txt", "cmake");
        m.insert(".cmake", "cmake");
        // other languages
        m.insert(".go", "go");
        m.insert("go.mod", "go");
        m.insert("go.sum", "text");
        m.insert(".rs", "rust");
        m.insert("cargo.toml", "toml");
        m.insert("cargo.lock", "toml");
        m.insert(".rb", "ruby");
        m.insert("gemfile", "ruby");
        m.insert("gemfile.lock", "text");
        m.insert("rakefile", "ruby");
        m.insert(".php", "php");
        m.insert("composer.json", "json");
        m.insert("composer.lock", "json");
        m.insert(".swift", "swift");
        m.insert("package.swift", "swift");
        m.insert(".dart", "dart");
        m.insert("pubspec.yaml", "yaml");
        m.insert("pubspec.lock", "yaml");
        m.insert(".lua", "lua");
        m.insert(".pl", "perl");
        m.insert(".pm", "perl");
        m.insert(".r", "r");
        m.insert(".jl", "julia");
        m.insert(".ex", "elixir");
        m.insert(".exs", "elixir");
        m.insert(".erl", "erlang");
        m.insert(".clj", "clojure");
        m.insert(".cljs", "clojure");
        // shell
        m.insert(".sh", "bash");
        m.insert(".bash", "bash");
        m.insert(".zsh", "zsh");
        m.insert(".fish", "fish");
        m.insert(".ps1", "powershell");
        m.insert(".psm1", "powershell");
        m.insert(".bat", "batch");
        m.insert(".cmd", "batch");
        // config and data
        m.insert(".json", "json");
        m.insert(".json5", "json");
        m.insert(".jsonc", "json");
        m.insert(".yaml", "yaml");
        m.insert(".yml", "yaml");
        m.insert(".xml", "xml");
        m.insert(".toml", "toml");
        m.insert(".ini", "ini");
        m.insert(".cfg", "ini");
        m.insert(".conf", "ini");
        m.insert(".config", "ini");
        m.insert(".properties", "properties");
        // containers
        m.insert("dockerfile", "dockerfile");
        m.insert("Dockerfile", "dockerfile");
        m.insert(".dockerfile", "dockerfile");
        m.insert("Dockerfile.dev", "dockerfile");
        m.insert("Dockerfile.prod", "dockerfile");
        m.insert("Dockerfile.test", "dockerfile");
        m.insert("docker-compose.yml", "yaml");
        m.insert("docker-compose.yaml", "yaml");
        m.insert("docker-compose.dev.yml", "yaml");
        m.insert("docker-compose.prod.yml", "yaml");
        m.insert("docker-compose.override.yml", "yaml");
        m.insert(".dockerignore", "text");
        m.insert("compose.yml", "yaml");
        m.insert("compose.yaml", "yaml");
        // kubernetes
        m.insert("deployment.yaml", "yaml");
        m.insert("deployment.yml", "yaml");
        m.insert("service.yaml", "yaml");
        m.insert("service.yml", "yaml");
        m.insert("ingress.yaml", "yaml");
        m.insert("ingress.yml", "yaml");
        m.insert("configmap.yaml", "yaml");
        m.insert("configmap.yml", "yaml");
        m.insert("secret.yaml", "yaml");
        m.insert("secret.yml", "yaml");
        m.insert("kustomization.yaml", "yaml");
        m.insert("kustomization.yml", "yaml");
        m.insert("helmfile.yaml", "yaml");
        m.insert("Chart.yaml", "yaml");
        m.insert("values.yaml", "yaml");
        m.insert("values.yml", "yaml");
        // infrastructure as code
        m.insert(".tf", "hcl");
        m.insert(".tfvars", "hcl");
        m.insert(".hcl", "hcl");
        m.insert("terraform.tfvars", "hcl");
        m.insert("variables.tf", "hcl");
        m.insert("outputs.tf", "hcl");
        m.insert("main.tf", "hcl");
        m.insert("Vagrantfile", "ruby");
        // ci / cd
        m.insert(".gitlab-ci.yml", "yaml");
        m.insert("gitlab-ci.yml", "yaml");
        m.insert(".travis.yml", "yaml");
        m.insert("travis.yml", "yaml");
        m.insert("circle.yml", "yaml");
        m.insert("Jenkinsfile", "groovy");
        m.insert("jenkinsfile", "groovy");
        m.insert("azure-pipelines.yml", "yaml");
        m.insert("azure-pipelines.yaml", "yaml");
        m.insert(".drone.yml", "yaml");
        m.insert("bitbucket-pipelines.yml", "yaml");
        m.insert("appveyor.yml", "yaml");
        m.insert(".appveyor.yml", "yaml");
        m.insert("action.yml", "yaml");
        m.insert("action.yaml", "yaml");
        // ansible
        m.insert("playbook.yml", "yaml");
        m.insert("playbook.yaml", "yaml");
        m.insert("ansible.cfg", "ini");
        m.insert("hosts", "ini");
        m.insert("inventory", "ini");
        // database
        m.insert(".sql", "sql");
        m.insert(".psql", "sql");
        m.insert(".mysql", "sql");
        m.insert(".prisma", "prisma");
        // docs
        m.insert(".md", "markdown");
        m.insert(".markdown", "markdown");
        m.insert(".txt", "text");
        m.insert(".rst", "rst");
        m.insert(".adoc", "asciidoc");
        m.insert("README", "markdown");
        m.insert("CHANGELOG", "markdown");
        m.insert("LICENSE", "text");
        m.insert("CONTRIBUTING", "markdown");
        // build
        m.insert("makefile", "makefile");
        m.insert("Makefile", "makefile");
        m.insert("GNUmakefile", "makefile");
        m.insert("makefile.am", "makefile");
        // environment files
        m.insert(".env", "bash");
        m.insert(".env.example", "bash");
        m.insert(".env.local", "bash");
        m.insert(".env.development", "bash");
        m.insert(".env.production", "bash");
        m.insert(".env.test", "bash");
        m.insert(".env.sample", "bash");
        m.insert(".envrc", "bash");
        m.insert(".flaskenv", "bash");
        // vcs helper files
        m.insert(".gitignore", "text");
        m.insert(".gitattributes", "text");
        m.insert(".gitmodules", "text");
        m.insert(".npmignore", "text");
        m.insert(".eslintignore", "text");
        // editor config
        m.insert(".editorconfig", "ini");
        m.insert(".vimrc", "vim");
        m.insert(".nvimrc", "vim");
        // api schemas
        m.insert(".graphql", "graphql");
        m.insert(".gql", "graphql");
        m.insert(".proto", "protobuf");
        m.insert(".avro", "json");
        m.insert(".thrift", "thrift");
        m.insert("openapi.yaml", "yaml");
        m.insert("openapi.yml", "yaml");
        m.insert("swagger.yaml", "yaml");
        m.insert("swagger.yml", "yaml");
        m
    };
}

/// Category groups checked in declaration order; first hit wins.
pub const FILE_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "source",
        &[
            ".py", ".js", ".ts", ".java", ".go", ".rs", ".rb", ".php", ".cpp", ".c", ".cs",
        ],
    ),
    (
        "config",
        &[".json", ".yaml", ".yml", ".toml", ".ini", ".env", ".config"],
    ),
    (
        "docker",
        &["dockerfile", "docker-compose.yml", "docker-compose.yaml", ".dockerignore"],
    ),
    ("iac", &[".tf", ".tfvars", ".hcl"]),
    ("ci_cd", &[".gitlab-ci.yml", "jenkinsfile", "azure-pipelines.yml"]),
    (
        "build",
        &["makefile", "cmakelists.txt", "build.gradle", "pom.xml"],
    ),
    ("docs", &[".md", ".rst", ".txt"]),
];

/// Outcome of sniffing a small prefix of an extensionless file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextProbe {
    Text,
    Binary,
    Unreadable,
}

/// Read up to 512 bytes and decide whether the file looks like UTF-8 text.
/// A decode error at the very end of the buffer is just a codepoint cut in
/// half, so it still counts as text.
pub fn probe_text(path: &Path) -> TextProbe {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return TextProbe::Unreadable,
    };
    let mut buf = [0u8; 512];
    let n = match file.read(&mut buf) {
        Ok(n) => n,
        Err(_) => return TextProbe::Unreadable,
    };
    let prefix = &buf[..n];
    if prefix.contains(&0) {
        return TextProbe::Binary;
    }
    match std::str::from_utf8(prefix) {
        Ok(_) => TextProbe::Text,
        Err(e) if e.error_len().is_none() => TextProbe::Text,
        Err(_) => TextProbe::Binary,
    }
}

/// Pure path-to-tag lookups over injected tables, so tests can substitute a
/// minimal mapping.
pub struct Classifier {
    languages: HashMap<&'static str, &'static str>,
    categories: Vec<(&'static str, &'static [&'static str])>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Classifier {
            languages: LANGUAGE_MAP.clone(),
            categories: FILE_CATEGORIES.to_vec(),
        }
    }

    pub fn with_tables(
        languages: HashMap<&'static str, &'static str>,
        categories: Vec<(&'static str, &'static [&'static str])>,
    ) -> Self {
        Classifier {
            languages,
            categories,
        }
    }

    /// Language hint for a path, or None to leave the file out of the report.
    /// Lookup order: lowercased filename, exact-case filename, lowercased
    /// extension, CI workflow rule, then a text probe for extensionless
    /// files.
    pub fn language_of(&self, path: &Path) -> Option<&'static str> {
        let name = path.file_name()?.to_string_lossy();
        let name_lower = name.to_lowercase();

        if let Some(&lang) = self.languages.get(name_lower.as_str()) {
            return Some(lang);
        }
        if let Some(&lang) = self.languages.get(&*name) {
            return Some(lang);
        }

        let ext = path.extension().map(|e| e.to_string_lossy().to_lowercase());
        if let Some(ext) = &ext {
            if let Some(&lang) = self.languages.get(format!(".{}", ext).as_str()) {
                return Some(lang);
            }
        }

        // GitHub workflow files are YAML whatever else the tables say.
        if in_workflows_dir(path) && matches!(ext.as_deref(), Some("yml") | Some("yaml")) {
            return Some("yaml");
        }

        if ext.is_none() {
            return match probe_text(path) {
                TextProbe::Text => Some("text"),
                TextProbe::Binary | TextProbe::Unreadable => None,
            };
        }

        None
    }

    /// Purpose tag for a path; always succeeds, defaulting to "other".
    pub fn category_of(&self, path: &Path) -> &'static str {
        let name_lower = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let suffix_lower = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        for &(category, names) in &self.categories {
            if names.contains(&name_lower.as_str()) || names.contains(&suffix_lower.as_str()) {
                return category;
            }
        }
        "other"
    }
}

fn in_workflows_dir(path: &Path) -> bool {
    let mut saw_github = false;
    for component in path.components() {
        let part = component.as_os_str().to_string_lossy();
        if part == ".github" {
            saw_github = true;
        } else if part == "workflows" && saw_github {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn extension_lookup() {
        let c = Classifier::new();
        assert_eq!(c.language_of(Path::new("src/main.py")), Some("python"));
        assert_eq!(c.language_of(Path::new("a/b/Lib.RS")), Some("rust"));
        assert_eq!(c.language_of(Path::new("x.unknownext")), None);
    }

    #[test]
    fn filename_lookup_beats_extension() {
        let c = Classifier::new();
        // pom.xml resolves by name before the .xml extension would
        assert_eq!(c.language_of(Path::new("pom.xml")), Some("xml"));
        assert_eq!(c.language_of(Path::new("Dockerfile")), Some("dockerfile"));
        assert_eq!(c.language_of(Path::new("Makefile")), Some("makefile"));
        assert_eq!(c.language_of(Path::new(".gitignore")), Some("text"));
    }

    #[test]
    fn workflow_files_are_yaml() {
        let c = Classifier::new();
        assert_eq!(
            c.language_of(Path::new(".github/workflows/ci.yml")),
            Some("yaml")
        );
    }

    #[test]
    fn extensionless_text_file_probes_as_text() {
        let tmp = TempDir::new().unwrap();
        let txt = tmp.path().join("NOTICE2");
        fs::write(&txt, "plain words\n").unwrap();
        let c = Classifier::new();
        assert_eq!(c.language_of(&txt), Some("text"));
    }

    #[test]
    fn extensionless_binary_file_is_dropped() {
        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("blob2");
        fs::write(&bin, [0u8, 159, 146, 150, 0, 1]).unwrap();
        let c = Classifier::new();
        assert_eq!(c.language_of(&bin), None);
    }

    #[test]
    fn probe_tri_state() {
        let tmp = TempDir::new().unwrap();
        let txt = tmp.path().join("plain");
        fs::write(&txt, "hello\n").unwrap();
        assert_eq!(probe_text(&txt), TextProbe::Text);

        let bin = tmp.path().join("blob");
        fs::write(&bin, [0u8; 16]).unwrap();
        assert_eq!(probe_text(&bin), TextProbe::Binary);

        assert_eq!(
            probe_text(&tmp.path().join("missing")),
            TextProbe::Unreadable
        );
    }

    #[test]
    fn categories_default_to_other() {
        let c = Classifier::new();
        assert_eq!(c.category_of(Path::new("main.py")), "source");
        assert_eq!(c.category_of(Path::new("config.json")), "config");
        assert_eq!(c.category_of(Path::new("Dockerfile")), "docker");
        assert_eq!(c.category_of(Path::new("main.tf")), "iac");
        assert_eq!(c.category_of(Path::new("README.md")), "docs");
        assert_eq!(c.category_of(Path::new("strange.xyz")), "other");
    }

    #[test]
    fn tables_are_injectable() {
        let mut langs = HashMap::new();
        langs.insert(".zz", "zlang");
        let cats: Vec<(&'static str, &'static [&'static str])> =
            vec![("zfiles", &[".zz"])];
        let c = Classifier::with_tables(langs, cats);
        assert_eq!(c.language_of(Path::new("a.zz")), Some("zlang"));
        assert_eq!(c.category_of(Path::new("a.zz")), "zfiles");
        assert_eq!(c.language_of(Path::new("a.py")), None);
        assert_eq!(c.category_of(Path::new("a.py")), "other");
    }
}
