use serde_json::json;

pub fn catalog_fixture() -> &'static str {
    return r#"
{
  "products": [
    {
      "id": 1,
      "brand": "CeraVe",
      "name": "Foaming Facial Cleanser",
      "category": "cleanser",
      "image": "https://example.com/images/1.png",
      "description": "A gentle foaming cleanser for normal to oily skin."
    },
    {
      "id": 2,
      "brand": "CeraVe",
      "name": "Moisturizing Cream",
      "category": "moisturizer",
      "image": "https://example.com/images/2.png",
      "description": "A rich cream with ceramides and hyaluronic acid."
    },
    {
      "id": 3,
      "brand": "La Roche-Posay",
      "name": "Anthelios Melt-in Sunscreen SPF 60",
      "category": "suncare",
      "image": "https://example.com/images/3.png",
      "description": "Broad spectrum protection with a lightweight finish."
    },
    {
      "id": 7,
      "brand": "L'Oreal Paris",
      "name": "Revitalift Derm Intensives Serum",
      "category": "moisturizer",
      "image": "https://example.com/images/7.png",
      "description": "A hyaluronic acid serum that plumps and hydrates."
    },
    {
      "id": 9,
      "brand": "Garnier",
      "name": "Micellar Cleansing Water",
      "category": "cleanser",
      "image": "https://example.com/images/9.png",
      "description": "Removes makeup and impurities without rinsing."
    }
  ]
}
"#
    .trim();
}

pub fn completion_fixture(content: &str) -> String {
    return json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "finish_reason": "stop",
                "message": {
                    "role": "assistant",
                    "content": content,
                }
            }
        ]
    })
    .to_string();
}
