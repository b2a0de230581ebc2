// Prompt constants for candidate screening.
// The reply schema keys (`pontuacoes`, `resumo`) are part of the wire contract
// parsed by `screening::scorer`; keep them in sync.

/// System instruction sent with every screening call.
pub const SCREENING_SYSTEM: &str =
    "Você é um especialista em RH que analisa currículos de forma objetiva e precisa.";

/// Screening prompt template.
/// Replace `{required_attrs}`, `{desired_attrs}` and `{cv_text}` before sending.
pub const SCREENING_PROMPT_TEMPLATE: &str = r#"Você é um especialista em RH analisando currículos. Analise o seguinte currículo em relação ao perfil da vaga e forneça uma pontuação de 1 a 5 para cada atributo (5 = muito aderente, 1 = não aderente).

PERFIL DA VAGA:

ATRIBUTOS REQUERIDOS:
{required_attrs}

ATRIBUTOS DESEJÁVEIS:
{desired_attrs}

CURRÍCULO PARA ANÁLISE:
{cv_text}

INSTRUÇÕES:
1. Para cada atributo requerido e desejável, atribua uma nota de 1 a 5
2. Forneça um resumo das qualidades do candidato em relação ao perfil
3. Seja objetivo e baseie-se apenas nas informações presentes no currículo
4. Responda em formato JSON com a seguinte estrutura:
{
    "pontuacoes": {
        "atributo1": nota,
        "atributo2": nota
    },
    "resumo": "Resumo das qualidades do candidato em relação ao perfil da vaga"
}

Responda APENAS com o JSON, sem texto adicional."#;
