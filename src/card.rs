//! 单词卡片草稿：四个输入字段、背景色与文字颜色模式，以及由草稿推导出的预览

use std::ops::Range;

/// 单词字段的字间距
pub const WORD_LETTER_SPACING: f32 = 1.25;
/// 拆分词字段的字间距
pub const FRAGMENTED_LETTER_SPACING: f32 = 0.88;

/// 8 位 RGBA 颜色（非预乘）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_array(c: [u8; 4]) -> Self {
        Self { r: c[0], g: c[1], b: c[2], a: c[3] }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// 由 0.0..=1.0 的分量构造，四舍五入到 8 位
    pub fn from_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r: q(r), g: q(g), b: q(b), a: q(a) }
    }

    /// 灰度色
    pub fn gray(white: f32) -> Self {
        Self::from_f32(white, white, white, 1.0)
    }
}

/// 卡片默认底色 (0.8, 0.6, 0.8)
pub fn default_background() -> Rgba {
    Rgba::from_f32(0.8, 0.6, 0.8, 1.0)
}

/// 近黑色文字 (0.08 灰)
pub fn near_black() -> Rgba {
    Rgba::gray(0.08)
}

/// 文字颜色模式（两段切换）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextMode {
    /// 白字
    #[default]
    Light,
    /// 近黑字
    Dark,
}

impl TextMode {
    /// 分段控件序号：0 为白字，其余为黑字
    pub fn from_segment(index: usize) -> Self {
        if index == 0 { TextMode::Light } else { TextMode::Dark }
    }

    pub fn text_color(self) -> Rgba {
        match self {
            TextMode::Light => Rgba::WHITE,
            TextMode::Dark => near_black(),
        }
    }
}

/// 输入字段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Word,
    FragmentedWord,
    Meaning,
    Example,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Word, Field::FragmentedWord, Field::Meaning, Field::Example];

    /// 该字段投射到预览标签时的样式
    pub fn style_for(self, text: &str) -> LabelStyle {
        match self {
            Field::Word => LabelStyle::kerned(text, WORD_LETTER_SPACING),
            Field::FragmentedWord => LabelStyle::kerned(text, FRAGMENTED_LETTER_SPACING),
            Field::Meaning | Field::Example => LabelStyle::default(),
        }
    }
}

/// 水平对齐
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// 对一段字符（按字符序号）追加统一的字间距
#[derive(Clone, Debug, PartialEq)]
pub struct Kerning {
    pub spacing: f32,
    pub range: Range<usize>,
}

/// 字间距作用范围：除最后一个字符外的全部字符，空串时为空范围
pub fn kerning_range(char_count: usize) -> Range<usize> {
    0..char_count.saturating_sub(1)
}

/// 预览标签样式
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelStyle {
    pub kerning: Option<Kerning>,
    /// None 表示沿用标签默认对齐（左对齐）
    pub align: Option<Align>,
}

impl LabelStyle {
    /// 居中并在 [0, len-1) 上加字间距；空范围不设字间距
    pub fn kerned(text: &str, spacing: f32) -> Self {
        let range = kerning_range(text.chars().count());
        let kerning = (!range.is_empty()).then_some(Kerning { spacing, range });
        Self {
            kerning,
            align: Some(Align::Center),
        }
    }

    pub fn align(&self) -> Align {
        self.align.unwrap_or(Align::Left)
    }
}

/// 预览标签
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewLabel {
    pub field: Field,
    pub text: String,
    pub color: Rgba,
    pub style: LabelStyle,
}

/// 由草稿推导出的预览面板内容，渲染与导出都只读它
#[derive(Clone, Debug, PartialEq)]
pub struct CardPreview {
    pub background: Rgba,
    pub labels: [PreviewLabel; 4],
}

/// 当前正在编辑的卡片
#[derive(Clone, Debug, PartialEq)]
pub struct CardDraft {
    pub word: String,
    pub fragmented_word: String,
    pub meaning: String,
    pub example: String,
    pub background: Rgba,
    pub text_mode: TextMode,
}

impl Default for CardDraft {
    fn default() -> Self {
        Self {
            word: String::new(),
            fragmented_word: String::new(),
            meaning: String::new(),
            example: String::new(),
            background: default_background(),
            text_mode: TextMode::default(),
        }
    }
}

impl CardDraft {
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Word => &self.word,
            Field::FragmentedWord => &self.fragmented_word,
            Field::Meaning => &self.meaning,
            Field::Example => &self.example,
        }
    }

    fn text_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Word => &mut self.word,
            Field::FragmentedWord => &mut self.fragmented_word,
            Field::Meaning => &mut self.meaning,
            Field::Example => &mut self.example,
        }
    }

    /// 输入框内容变化（每次按键）
    pub fn input_changed(&mut self, field: Field, text: &str) {
        let slot = self.text_mut(field);
        slot.clear();
        slot.push_str(text);
    }

    pub fn set_text_mode(&mut self, mode: TextMode) {
        self.text_mode = mode;
    }

    pub fn set_background(&mut self, color: Rgba) {
        self.background = color;
    }

    pub fn preview(&self) -> CardPreview {
        let color = self.text_mode.text_color();
        let labels = Field::ALL.map(|field| {
            let text = self.text(field).to_owned();
            PreviewLabel {
                field,
                style: field.style_for(&text),
                text,
                color,
            }
        });
        CardPreview {
            background: self.background,
            labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait LabelOf {
        fn label(&self, field: Field) -> &PreviewLabel;
    }

    impl LabelOf for CardPreview {
        fn label(&self, field: Field) -> &PreviewLabel {
            self.labels.iter().find(|l| l.field == field).unwrap()
        }
    }

    #[test]
    fn word_label_mirrors_text_with_kerning() {
        let mut draft = CardDraft::default();
        draft.input_changed(Field::Word, "serendipity");
        let label = draft.preview().label(Field::Word).clone();
        assert_eq!(label.text, "serendipity");
        assert_eq!(label.style.align, Some(Align::Center));
        assert_eq!(
            label.style.kerning,
            Some(Kerning { spacing: 1.25, range: 0..10 })
        );
    }

    #[test]
    fn fragmented_word_uses_looser_spacing() {
        let mut draft = CardDraft::default();
        draft.input_changed(Field::FragmentedWord, "ser·en·dip·i·ty");
        let label = draft.preview().label(Field::FragmentedWord).clone();
        assert_eq!(label.text, "ser·en·dip·i·ty");
        let kerning = label.style.kerning.expect("kerned");
        assert_eq!(kerning.spacing, 0.88);
        // 按字符计数，而不是字节
        assert_eq!(kerning.range, 0..14);
    }

    #[test]
    fn empty_and_single_char_input_do_not_underflow() {
        let mut draft = CardDraft::default();
        for text in ["", "a"] {
            draft.input_changed(Field::Word, text);
            draft.input_changed(Field::FragmentedWord, text);
            let preview = draft.preview();
            for field in [Field::Word, Field::FragmentedWord] {
                let label = preview.label(field);
                assert_eq!(label.text, text);
                assert_eq!(label.style.kerning, None);
                assert_eq!(label.style.align, Some(Align::Center));
            }
        }
        assert_eq!(kerning_range(0), 0..0);
    }

    #[test]
    fn meaning_and_example_are_copied_unstyled() {
        let mut draft = CardDraft::default();
        draft.input_changed(Field::Meaning, "意外发现珍奇事物的本领");
        draft.input_changed(Field::Example, "It was pure serendipity.\nWe met by chance.");
        let preview = draft.preview();
        assert_eq!(preview.label(Field::Meaning).text, "意外发现珍奇事物的本领");
        assert_eq!(
            preview.label(Field::Example).text,
            "It was pure serendipity.\nWe met by chance."
        );
        for field in [Field::Meaning, Field::Example] {
            assert_eq!(preview.label(field).style, LabelStyle::default());
            assert_eq!(preview.label(field).style.align(), Align::Left);
        }
    }

    #[test]
    fn every_keystroke_replaces_previous_text() {
        let mut draft = CardDraft::default();
        for typed in ["w", "wo", "wor", "word", "wor"] {
            draft.input_changed(Field::Word, typed);
            assert_eq!(draft.preview().label(Field::Word).text, typed);
        }
    }

    #[test]
    fn mode_sets_all_label_colors() {
        let mut draft = CardDraft::default();
        draft.set_text_mode(TextMode::from_segment(0));
        assert!(draft.preview().labels.iter().all(|l| l.color == Rgba::WHITE));

        draft.set_text_mode(TextMode::from_segment(1));
        draft.set_text_mode(TextMode::from_segment(1));
        assert!(
            draft
                .preview()
                .labels
                .iter()
                .all(|l| l.color == Rgba::rgb(20, 20, 20))
        );
    }

    #[test]
    fn picked_color_last_write_wins() {
        let mut draft = CardDraft::default();
        assert_eq!(draft.preview().background, Rgba::rgb(204, 153, 204));

        let teal = Rgba::rgb(0, 128, 128);
        let amber = Rgba { r: 255, g: 191, b: 0, a: 200 };
        draft.set_background(teal);
        draft.set_background(teal);
        assert_eq!(draft.preview().background, teal);
        draft.set_background(amber);
        assert_eq!(draft.preview().background, amber);
    }
}
