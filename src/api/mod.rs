use actix_web::HttpResponse;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};

pub mod offer_letter;
pub mod salary;
pub mod user;

/// Wraps rendered PDF bytes as a download.
pub(crate) fn pdf_attachment(pdf: Vec<u8>, filename: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::CONTENT_DISPOSITION;

    #[test]
    fn pdf_attachment_sets_download_headers() {
        let resp = pdf_attachment(b"%PDF-1.4".to_vec(), "John_SalarySlip_June_2025.pdf".into());

        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/pdf"
        );
        let disposition = resp.headers().get(CONTENT_DISPOSITION).unwrap().to_str().unwrap();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("John_SalarySlip_June_2025.pdf"));
    }
}
