use encoding_rs::Encoding;
use markup5ever_rcdom::Handle;

use crate::document::LiveDocument;
use crate::parsers::html::dom::get_child_node_by_name;
use crate::parsers::html::metadata::{get_document_lang, get_valid_charset, set_document_lang};
use crate::translation::config::{constants, LocaliserConfig};
use crate::translation::error::helpers::{log_error, validation_error};
use crate::translation::error::LocaliserResult;
use crate::translation::{EngineOptions, LocaleOverrides, LookupTable, ScanStats, Strategy, TranslationEngine};

/// 文档本地化选项
///
/// `encoding` 为 `None` 时先按 UTF-8 解析，再采用文档自身声明的编码。
#[derive(Debug, Clone)]
pub struct LocaliserOptions {
    pub encoding: Option<String>,
    pub locale: String,
    pub overrides: LocaleOverrides,
    pub strategy: Strategy,
    pub boundary_class: String,
    /// 把 `<html lang>` 更新为有效语言
    pub set_lang: bool,
}

impl Default for LocaliserOptions {
    fn default() -> Self {
        Self {
            encoding: None,
            locale: constants::DEFAULT_LOCALE.to_string(),
            overrides: LocaleOverrides::new(),
            strategy: Strategy::default(),
            boundary_class: constants::DEFAULT_BOUNDARY_CLASS.to_string(),
            set_lang: false,
        }
    }
}

impl From<&LocaliserConfig> for LocaliserOptions {
    fn from(config: &LocaliserConfig) -> Self {
        Self {
            locale: config.locale.clone(),
            overrides: config.overrides.iter().map(String::as_str).collect(),
            strategy: config.strategy,
            boundary_class: config.boundary_class.clone(),
            ..Self::default()
        }
    }
}

/// 本地化一份 HTML 文档
///
/// 解析文档，对 `<body>`（没有时对整个文档）扫描一次，再按文档编码序列化。
///
/// # Arguments
///
/// * `input_data` - 原始 HTML 字节
/// * `lookup_table` - 翻译查找表
/// * `options` - 语言、策略、边界类名与编码
///
/// # Returns
///
/// 序列化后的文档字节和本次扫描的统计信息
pub fn localise_document(
    input_data: &[u8],
    lookup_table: &LookupTable,
    options: &LocaliserOptions,
) -> LocaliserResult<(Vec<u8>, ScanStats)> {
    // 1. 验证编码
    EncodingValidator::new().validate_options(options)?;

    // 2. 确定编码并解析
    let (document, document_encoding) = EncodingProcessor::new()
        .process_encoding(input_data, options.encoding.as_deref())
        .or_else(log_error)?;

    // 3. 扫描并翻译
    let container = translation_root(&document);
    let mut engine = TranslationEngine::new(
        container,
        EngineOptions {
            lookup_table: lookup_table.clone(),
            locale: options.locale.clone(),
            overrides: options.overrides.clone(),
            strategy: options.strategy,
            boundary_class: options.boundary_class.clone(),
        },
    );
    let effective_locale = engine.effective_locale();
    if lookup_table.entry_count(&effective_locale) == 0 {
        tracing::warn!("查找表中没有语言 {} 的译文，文本将保持原样", effective_locale);
    }

    let stats = engine.scan(&document);

    if options.set_lang {
        tracing::debug!(
            "更新文档语言: {:?} -> {}",
            get_document_lang(document.document()),
            effective_locale
        );
        set_document_lang(document.document(), &effective_locale);
    }

    tracing::info!(
        "本地化完成: locale={}, strategy={}, 改写 {} 处文本",
        effective_locale,
        engine.strategy(),
        stats.texts_rewritten
    );

    // 4. 序列化
    let output = document.serialize(&document_encoding)?;
    Ok((output, stats))
}

/// 扫描根：`<body>`，没有时为整个文档
fn translation_root(document: &LiveDocument) -> Handle {
    get_child_node_by_name(document.document(), "html")
        .and_then(|html| get_child_node_by_name(&html, "body"))
        .unwrap_or_else(|| document.document().clone())
}

/// 编码验证器
pub struct EncodingValidator;

impl EncodingValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_options(&self, options: &LocaliserOptions) -> LocaliserResult<()> {
        if let Some(encoding) = &options.encoding {
            if Encoding::for_label_no_replacement(encoding.as_bytes()).is_none() {
                return Err(validation_error(format!("unknown encoding \"{}\"", encoding)));
            }
        }
        Ok(())
    }
}

impl Default for EncodingValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// 编码处理器
pub struct EncodingProcessor;

impl EncodingProcessor {
    pub fn new() -> Self {
        Self
    }

    /// 解析文档并确定其编码
    ///
    /// 显式给出的编码优先；否则采用文档 `<meta>` 中声明且有效的编码，并按它重新解析。
    pub fn process_encoding(
        &self,
        input_data: &[u8],
        input_encoding: Option<&str>,
    ) -> LocaliserResult<(LiveDocument, String)> {
        if let Some(encoding) = input_encoding {
            return Ok((LiveDocument::parse(input_data, encoding)?, encoding.to_string()));
        }

        let document = LiveDocument::parse(input_data, constants::DEFAULT_ENCODING)?;

        match get_valid_charset(document.document()) {
            Some(charset) if !charset.eq_ignore_ascii_case(constants::DEFAULT_ENCODING) => {
                tracing::debug!("按文档声明的编码重新解析: {}", charset);
                Ok((LiveDocument::parse(input_data, charset)?, charset.to_string()))
            }
            _ => Ok((document, constants::DEFAULT_ENCODING.to_string())),
        }
    }
}

impl Default for EncodingProcessor {
    fn default() -> Self {
        Self::new()
    }
}
