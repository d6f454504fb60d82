//! The schemas the dashboard ships with.

use crate::{
    ConditionalBranch, ConditionalRuleSet, EntityKind, EntitySchema, FieldRule, UploadLimits,
};

const EMAIL_MESSAGE: &str = "Email must be a valid email address";

/// 3 MiB.
pub const AVATAR_MAX_BYTES: u64 = 3_145_728;

pub const AVATAR_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

pub const JOB_POSTING_MAX_IMAGES: usize = 3;

/// User accounts. `roleName` selects the job-seeker or employer profile rules.
pub fn user_schema() -> EntitySchema {
    let base = vec![
        FieldRule::string("fullName").require("Full Name is required"),
        FieldRule::email("email")
            .require("Email is required")
            .with_type_message(EMAIL_MESSAGE),
        FieldRule::file("avatarUrl").with_upload_limits(
            UploadLimits::new()
                .max_bytes(AVATAR_MAX_BYTES)
                .accept(&AVATAR_TYPES),
        ),
        FieldRule::boolean("isActive"),
        FieldRule::boolean("isVerifyEmail"),
        FieldRule::boolean("isSupperuser"),
        FieldRule::boolean("isStaff"),
        FieldRule::string("lastLogin"),
        FieldRule::string("createAt"),
        FieldRule::string("updateAt"),
        FieldRule::string("roleName").require("Role is required"),
        FieldRule::string("facebookUrl"),
        FieldRule::string("youtubeUrl"),
        FieldRule::string("linkedinUrl"),
    ];

    let job_seeker = ConditionalBranch::new(
        "JOB_SEEKER",
        "jobSeekerProfile",
        vec![
            FieldRule::string("jobSeekerProfile.phone").require("Phone number is required"),
            FieldRule::date("jobSeekerProfile.birthday").require("Birthday is required"),
            FieldRule::string("jobSeekerProfile.gender").require("Gender is required"),
            FieldRule::string("jobSeekerProfile.maritalStatus")
                .require("Marital status is required"),
        ],
    );

    let employer = ConditionalBranch::new(
        "EMPLOYER",
        "company",
        vec![
            FieldRule::string("company.companyName").require("Company name is required"),
            FieldRule::email("company.companyEmail")
                .require("Company email is required")
                .with_type_message(EMAIL_MESSAGE),
            FieldRule::string("company.companyPhone").require("Company phone is required"),
            FieldRule::string("company.websiteUrl"),
            FieldRule::string("company.fieldOperation")
                .require("Field of operation is required"),
            FieldRule::number("company.employeeSize")
                .require("Employee size is required")
                .with_type_message("Employee size must be a number"),
            FieldRule::string("company.slug"),
            FieldRule::string("company.taxCode"),
            FieldRule::string("company.since"),
            FieldRule::string("company.location.address").require("Address is required"),
            FieldRule::number("company.location.lat"),
            FieldRule::number("company.location.lng"),
        ],
    );

    EntitySchema::new(EntityKind::User, base)
        .with_conditional(ConditionalRuleSet::new("roleName", vec![job_seeker, employer]))
}

/// Job postings. Every field applies; there is no discriminator. Messages
/// are the Vietnamese ones the posting form shows.
pub fn job_posting_schema() -> EntitySchema {
    let base = vec![
        FieldRule::string("companyName").require("Tên công ty là bắt buộc"),
        FieldRule::string("jobTitle").require("Tiêu đề công việc là bắt buộc"),
        FieldRule::email("contactEmail")
            .require("Email liên hệ là bắt buộc")
            .with_type_message("Email không hợp lệ"),
        FieldRule::string("contactPhone").require("Số điện thoại là bắt buộc"),
        FieldRule::string("salaryRange").require("Mức lương là bắt buộc"),
        FieldRule::string("applicationDeadline").require("Hạn nộp hồ sơ là bắt buộc"),
        FieldRule::string("careerLevel").require("Cấp bậc là bắt buộc"),
        FieldRule::string("workType").require("Hình thức làm việc là bắt buộc"),
        FieldRule::string("jobDescription").require("Mô tả công việc là bắt buộc"),
        FieldRule::string("jobRequirements").require("Yêu cầu công việc là bắt buộc"),
        FieldRule::string("jobBenefits").require("Quyền lợi là bắt buộc"),
        FieldRule::string("contactPerson").require("Người liên hệ là bắt buộc"),
        FieldRule::string("contactAddress").require("Địa chỉ là bắt buộc"),
        FieldRule::string("recruitmentArea").require("Khu vực tuyển là bắt buộc"),
        FieldRule::string("genderRequirement").require("Yêu cầu giới tính là bắt buộc"),
        FieldRule::number("hiringCount").require("Số lượng tuyển là bắt buộc"),
        FieldRule::array("images", 1)
            .require("Images is required")
            .with_min_items_message("Images is required")
            .with_upload_limits(UploadLimits::new().max_files(JOB_POSTING_MAX_IMAGES)),
    ];

    EntitySchema::new(EntityKind::JobPosting, base)
}
