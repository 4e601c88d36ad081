//! Diagnostic hints
//!
//! 已知的"可执行文件缺失"特征串到补救提示的映射，与分类决策树分开维护

/// 配置 worker 可执行文件的提示
pub const EXECUTABLE_HINT: &str = "Check that the mood worker executable is installed and reachable: \
     set MOODTUNE_WORKER__EXECUTABLE (worker.executable in config.toml) or add it to PATH.";

/// (特征串, 提示)，按顺序匹配，大小写不敏感
///
/// 只收录 shell 与加载器报告"程序不存在"时的固定格式，
/// worker 自身的语义信息（如 "model file not found"）不会命中
const HINT_TABLE: &[(&str, &str)] = &[
    ("enoent", EXECUTABLE_HINT),
    // bash: python3: command not found
    ("command not found", EXECUTABLE_HINT),
    // sh: 1: python3: not found
    (": not found", EXECUTABLE_HINT),
    // /usr/bin/env: 'python3': No such file or directory
    ("': no such file or directory", EXECUTABLE_HINT),
    // python3: can't open file '/app/detect_emotion.py': [Errno 2] ...
    ("can't open file", EXECUTABLE_HINT),
    ("is not recognized as an internal or external command", EXECUTABLE_HINT),
    ("cannot find the file", EXECUTABLE_HINT),
];

/// 查找与诊断文本匹配的提示
pub fn hint_for(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    HINT_TABLE
        .iter()
        .find(|(pattern, _)| lowered.contains(pattern))
        .map(|(_, hint)| *hint)
}

/// 若匹配到提示则追加到文本末尾
pub fn with_hint(text: String) -> String {
    match hint_for(&text) {
        Some(hint) => format!("{} Hint: {}", text, hint),
        None => text,
    }
}
