use graphql_parser::schema::{Document, ParseError};

#[inline]
pub fn safe_parse_schema(sdl: &str) -> Result<Document<'static, String>, ParseError> {
    graphql_parser::parse_schema::<String>(sdl).map(|doc| doc.into_static())
}
