mod tokenizers;

pub use self::tokenizers::shingle_words;
pub use self::tokenizers::tokenize_text;
