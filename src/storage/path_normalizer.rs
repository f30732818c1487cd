pub struct PathNormalizer;

impl PathNormalizer {
    /// 将 AList 路径解析为规范的 "/a/b/c" 格式（无末尾斜杠，除根目录外）
    pub fn normalize(raw: &str) -> String {
        // 全部替换为正斜杠
        let raw = raw.replace('\\', "/");

        let mut comps: Vec<&str> = Vec::new();
        for comp in raw.split('/') {
            if comp.is_empty() || comp == "." {
                continue;
            }
            if comp == ".." {
                comps.pop();
            } else {
                comps.push(comp);
            }
        }

        if comps.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", comps.join("/"))
        }
    }

    /// 挂载路径 + 浏览路径
    pub fn join(mount: &str, path: &str) -> String {
        Self::normalize(&format!("{}/{}", mount, path))
    }

    /// 对象存储的键前缀：去掉开头斜杠，合并重复斜杠，非空时以 "/" 结尾
    pub fn object_prefix(folder: &str, path: &str) -> String {
        let comps: Vec<&str> = folder
            .split('/')
            .chain(path.split('/'))
            .filter(|c| !c.is_empty())
            .collect();

        if comps.is_empty() {
            String::new()
        } else {
            format!("{}/", comps.join("/"))
        }
    }

    /// 把完整前缀/路径转换为相对于根的浏览路径，目录统一以 "/" 结尾
    pub fn browse_path(root: &str, full: &str) -> String {
        let rel = full.strip_prefix(root).unwrap_or(full);
        let rel = rel.trim_start_matches('/');
        if rel.is_empty() || rel.ends_with('/') {
            rel.to_string()
        } else {
            format!("{}/", rel)
        }
    }
}
