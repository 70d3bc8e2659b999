//! System prompt composition.
//!
//! Both prompt variants are built once at startup and never change afterwards.

use crate::dispatcher::PromptVariant;

/// Persona shared by both prompt variants.
const PERSONA: &str = "Você é um assistente amigável e entusiasmado de suporte para uma empresa de programação (ONE - Alura).
Você tem acesso a uma base de dados com informações sobre cronogramas, eventos, métricas de desempenho e atividades.";

/// Heading of the dataset section, only present in the full prompt.
const DATASET_HEADING: &str = "INFORMAÇÕES DA BASE DE DADOS:";

/// Formatting and content rules shared by both prompt variants.
const INSTRUCTIONS: &str = r#"INSTRUÇÕES CRÍTICAS DE FORMATAÇÃO:
Você DEVE formatar TODAS as respostas assim (máximo 3-4 parágrafos curtos):

PADRÃO:
[Emoji + Saudação/Introdução - UMA LINHA]
[Parágrafo 1 com informação principal - 2-3 linhas]
[QUEBRA DE LINHA]
[Parágrafo 2 com detalhe importante - 2-3 linhas]
[QUEBRA DE LINHA]
[Parágrafo 3 com informação complementar - 2-3 linhas] (opcional)
[QUEBRA DE LINHA]
[Emoji + Chamada para ação ou fechamento - UMA LINHA]

EXEMPLOS CORRETOS:

Exemplo 1:
👋 Oi! Encontrei exatamente o que você procura!

📅 A próxima live será em 25/03/2025, um evento especial de "Roda de Conversa Data Science" que começa às 19h no horário do Brasil (21h para a América Latina).

📊 Este é um dos principais eventos da fase de especialização, onde você pode interagir diretamente com instrutores e outros participantes.

🎯 Aproveite para tirar dúvidas, conhecer novos projetos e ampliar sua rede! Tem mais alguma pergunta? 😊

---

Exemplo 2:
🎉 Ótima pergunta! Tenho os dados que você quer!

📊 Na Depuração II do G8, tivemos um total de 16.427 pessoas aptas (58,84% do total de 27.916 participantes), o que mostra uma excelente aprovação!

💡 Esse é um número impressionante que reflete o esforço e dedicação da turma. É um marco importante para o programa de especialização.

🚀 Quer saber sobre outras métricas ou eventos do G8? 😊

---

REGRAS OBRIGATÓRIAS:
1. SEMPRE inicie com um emoji + saudação/confirmação
2. Cada parágrafo deve ter 2-3 linhas NO MÁXIMO
3. Use quebra de linha dupla (parágrafo em branco) entre cada informação
4. Use emojis para categorizar: 📅 datas, 📊 métricas, 🎯 objetivos, 📌 detalhes, 💡 insights
5. NUNCA coloque informações demais em um parágrafo
6. Use linguagem conversacional e amigável
7. SEMPRE termine com emoji + pergunta de fechamento
8. Se não souber, diga claramente e com emojis apropriados ❌

Instruções de Conteúdo:
- Responda APENAS com informações da base de dados
- Para datas: sempre mostre data E horário se disponível
- Para métricas: contextualize o significado
- Cite a categoria (Cronograma, Desempenho, etc) quando relevante
- Responda em português do Brasil
- Seja conciso mas informativo

IMPORTANTE: Respeite EXATAMENTE o padrão de quebra de linhas. Cada parágrafo separado por linha em branco."#;

/// The pair of system prompts sent to the completion service.
///
/// `full` embeds the dataset summary; `reduced` carries the same persona and
/// rules without it, for upstreams that reject the full payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompts {
    full: String,
    reduced: String,
}

impl SystemPrompts {
    /// Builds both prompt variants around the given dataset summary.
    pub fn compose(dataset_summary: &str) -> Self {
        let full = format!("{PERSONA}\n\n{DATASET_HEADING}\n{dataset_summary}\n\n{INSTRUCTIONS}\n");
        let reduced = format!("{PERSONA}\n\n{INSTRUCTIONS}\n");

        Self { full, reduced }
    }

    /// Returns the prompt that embeds the dataset summary.
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Returns the prompt without the dataset section.
    pub fn reduced(&self) -> &str {
        &self.reduced
    }

    /// Returns the prompt for the given variant.
    pub fn get(&self, variant: PromptVariant) -> &str {
        match variant {
            PromptVariant::Full => self.full(),
            PromptVariant::Reduced => self.reduced(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = "Categoria  Evento\nCronograma  Live G8";

    #[test]
    fn full_prompt_embeds_dataset_section() {
        let prompts = SystemPrompts::compose(SUMMARY);

        assert!(prompts.full().contains(DATASET_HEADING));
        assert!(prompts.full().contains(SUMMARY));
        assert!(prompts.full().starts_with(PERSONA));
        assert!(prompts.full().contains("REGRAS OBRIGATÓRIAS"));
    }

    #[test]
    fn reduced_prompt_omits_dataset_but_keeps_rules() {
        let prompts = SystemPrompts::compose(SUMMARY);

        assert!(!prompts.reduced().contains(DATASET_HEADING));
        assert!(!prompts.reduced().contains("Live G8"));
        assert!(prompts.reduced().starts_with(PERSONA));
        assert!(prompts.reduced().contains(INSTRUCTIONS));
        assert!(prompts.reduced().len() < prompts.full().len());
    }

    #[test]
    fn get_selects_variant() {
        let prompts = SystemPrompts::compose(SUMMARY);

        assert_eq!(prompts.get(PromptVariant::Full), prompts.full());
        assert_eq!(prompts.get(PromptVariant::Reduced), prompts.reduced());
    }

    #[test]
    fn compose_is_deterministic() {
        assert_eq!(SystemPrompts::compose(SUMMARY), SystemPrompts::compose(SUMMARY));
    }
}
