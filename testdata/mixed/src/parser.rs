use std::str::SplitWhitespace;

pub struct Words<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.inner.next()
    }
}

pub fn words(input: &str) -> Words<'_> {
    Words {
        inner: input.split_whitespace(),
    }
}
